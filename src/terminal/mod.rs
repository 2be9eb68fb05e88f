//! Terminal handle shared by every render path.
//!
//! One process, one real terminal: the output sink, column-count
//! query, raw-mode state, and interactivity flag live behind a single
//! [`SharedTerminal`] so the editor, live regions, and the layout
//! manager never write past each other.
//!
//! Tests construct a terminal over an in-memory sink with a fixed
//! column count; production code uses [`Terminal::stdout`].

mod cursor_guard;

pub use cursor_guard::CursorGuard;

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crossterm::terminal as ct;
use crossterm::tty::IsTty;

/// Single-threaded shared handle to the one real terminal.
pub type SharedTerminal = Rc<RefCell<Terminal>>;

/// The output side of the terminal plus the queries render paths need.
pub struct Terminal {
    out: Box<dyn Write>,
    columns_override: Option<usize>,
    interactive: bool,
    raw: bool,
}

impl Terminal {
    /// Terminal over the process stdout, interactive when stdout is a
    /// TTY.
    pub fn stdout() -> SharedTerminal {
        let interactive = io::stdout().is_tty();
        Rc::new(RefCell::new(Self {
            out: Box::new(io::stdout()),
            columns_override: None,
            interactive,
            raw: false,
        }))
    }

    /// Terminal over an arbitrary sink with a fixed column count.
    ///
    /// The backbone of render tests: pass a shared `Vec<u8>` writer
    /// and assert on the exact byte sequence afterwards.
    pub fn with_writer(out: Box<dyn Write>, columns: usize, interactive: bool) -> SharedTerminal {
        Rc::new(RefCell::new(Self {
            out,
            columns_override: Some(columns),
            interactive,
            raw: false,
        }))
    }

    /// Current column count; `0` when unknown.
    ///
    /// Re-queried on every render, which is what lets the layout
    /// self-correct one interaction after a resize.
    pub fn columns(&self) -> usize {
        if let Some(cols) = self.columns_override {
            return cols;
        }
        ct::size().map(|(w, _)| w as usize).unwrap_or(0)
    }

    /// Whether output is going to a real terminal.
    ///
    /// When false, every render path degrades to plain sequential
    /// text: no cursor movement, no erasing, no animation.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Put the terminal into raw mode for keystroke-level input.
    /// Idempotent; skipped entirely for non-interactive terminals.
    pub fn enable_raw(&mut self) -> io::Result<()> {
        if self.interactive && !self.raw {
            ct::enable_raw_mode()?;
            self.raw = true;
        }
        Ok(())
    }

    /// Leave raw mode. Idempotent.
    pub fn disable_raw(&mut self) -> io::Result<()> {
        if self.raw {
            ct::disable_raw_mode()?;
            self.raw = false;
        }
        Ok(())
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }
}

impl Write for Terminal {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.disable_raw();
    }
}

/// Shared in-memory sink for inspecting rendered bytes in tests.
#[derive(Clone, Default)]
pub struct CaptureSink(Rc<RefCell<Vec<u8>>>);

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Interactive test terminal over a capture sink.
pub fn test_terminal(columns: usize) -> (SharedTerminal, CaptureSink) {
    let sink = CaptureSink::new();
    let term = Terminal::with_writer(Box::new(sink.clone()), columns, true);
    (term, sink)
}

/// Non-interactive test terminal over a capture sink.
pub fn test_pipe(columns: usize) -> (SharedTerminal, CaptureSink) {
    let sink = CaptureSink::new();
    let term = Terminal::with_writer(Box::new(sink.clone()), columns, false);
    (term, sink)
}
