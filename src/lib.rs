//! # shoreline
//!
//! Terminal input and render coordination for inline CLIs.
//!
//! shoreline splits the screen into a scrolling output zone and a
//! pinned active zone, and coordinates everything that wants to draw
//! into them: a raw-mode line editor with history and completion,
//! animated live regions that freeze into scrollback, and a layout
//! manager that keeps permanent output above the pinned content.
//!
//! ## Modules
//!
//! - [`input`] - raw chunk reading and key decoding
//! - [`editor`] - line-editing sessions ([`editor::read_line`])
//! - [`live`] - spinners and sections that animate, then freeze
//! - [`layout`] - the two-zone layout manager
//! - [`terminal`] - shared terminal handle, raw mode, cursor guard
//! - [`render`] - cursor arithmetic and ANSI output plumbing
//! - [`text`] - display-width measurement, ANSI stripping
//! - [`style`] - composable SGR styling
//! - [`cancel`] - two-stage interrupt token
//!
//! Everything is single-threaded: one terminal, one event loop, shared
//! handles via `Rc<RefCell<...>>`. Render paths return `io::Result`
//! and treat a failed terminal write as fatal.

pub mod cancel;
pub mod editor;
pub mod input;
pub mod layout;
pub mod live;
pub mod render;
pub mod style;
pub mod terminal;
pub mod text;

pub use cancel::{CancelState, CancelToken};
pub use editor::{Resolution, Session, SessionOptions, read_line};
pub use input::{KeyEvent, Modifier, decode};
pub use layout::{Layout, LayoutStrategy};
pub use live::{Section, Spinner};
pub use style::Style;
pub use terminal::{SharedTerminal, Terminal};
