//! Raw keystroke input: decoding and chunked stdin reads.
//!
//! The decoder turns one raw input chunk into a structured key event;
//! the reader delivers those chunks, with an optional timeout so the
//! caller's loop can wake for animation deadlines between keystrokes.

mod decoder;
mod reader;

pub use decoder::{KeyEvent, Modifier, decode};
pub use reader::{Chunk, RawReader};
