//! Rendered-width measurement for terminal text.
//!
//! Everything the engine draws is measured here before it touches the
//! screen: cursor arithmetic and erase arithmetic are only correct if
//! the measured width matches what the terminal actually rendered.
//!
//! - ANSI escape sequences occupy zero cells and are stripped first
//! - Wide characters (CJK, most emoji) occupy two cells
//! - Combining marks and other zero-width codepoints occupy none

mod ansi;
mod width;

pub use ansi::strip_ansi;
pub use width::{char_width, grapheme_width, string_width};
