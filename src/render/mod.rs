//! Terminal output plumbing: escape helpers, batched output, and the
//! row/column arithmetic every redraw-in-place path depends on.
//!
//! The engine never writes a partial erase/redraw cycle to the
//! terminal. Each render assembles the full byte sequence in an
//! [`OutputBuffer`] and flushes it in one write, so a cycle can never
//! be interleaved with another writer on the same stream.

pub mod ansi;
pub mod cursor;
mod output;

pub use output::OutputBuffer;
