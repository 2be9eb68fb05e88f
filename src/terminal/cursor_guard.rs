//! Reference-counted cursor visibility.
//!
//! The real cursor is hidden while any live region is animating and
//! must come back exactly when the last one ends, including across
//! nested and sequential regions. A process-wide counter guards the
//! hide/show pair; a registered exit hook force-shows the cursor if
//! the process dies while the count is nonzero.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::render::ansi;

use super::SharedTerminal;

/// How many [`CursorGuard`]s are currently holding the cursor hidden.
static HIDDEN: AtomicUsize = AtomicUsize::new(0);

/// Scoped hold on cursor invisibility.
///
/// Acquiring hides the cursor when the count goes 0→1; dropping shows
/// it when the count returns to 0. Acquiring on a non-interactive
/// terminal is a no-op hold.
pub struct CursorGuard {
    term: SharedTerminal,
    counted: bool,
}

impl CursorGuard {
    pub fn acquire(term: &SharedTerminal) -> io::Result<Self> {
        let mut t = term.borrow_mut();
        if !t.is_interactive() {
            return Ok(Self {
                term: term.clone(),
                counted: false,
            });
        }
        if HIDDEN.fetch_add(1, Ordering::SeqCst) == 0 {
            install_exit_hook();
            ansi::cursor_hide(&mut *t)?;
            t.flush()?;
        }
        drop(t);
        Ok(Self {
            term: term.clone(),
            counted: true,
        })
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        if self.counted && HIDDEN.fetch_sub(1, Ordering::SeqCst) == 1 {
            let mut t = self.term.borrow_mut();
            let _ = ansi::cursor_show(&mut *t);
            let _ = t.flush();
        }
    }
}

#[cfg(unix)]
fn install_exit_hook() {
    use std::sync::Once;
    static HOOK: Once = Once::new();
    HOOK.call_once(|| unsafe {
        libc::atexit(emergency_show_cursor);
    });
}

#[cfg(not(unix))]
fn install_exit_hook() {}

/// Runs at process exit: if anything still holds the cursor hidden,
/// show it on the real terminal. Writes straight to fd 1 because the
/// shared handle may already be gone.
#[cfg(unix)]
extern "C" fn emergency_show_cursor() {
    if HIDDEN.load(Ordering::SeqCst) > 0 {
        const SHOW: &[u8] = b"\x1b[?25h";
        unsafe {
            libc::write(libc::STDOUT_FILENO, SHOW.as_ptr().cast(), SHOW.len());
        }
    }
}
