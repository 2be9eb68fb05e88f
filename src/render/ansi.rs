//! ANSI escape sequences for inline (non-alternate-screen) rendering.
//!
//! Only the control set the engine actually emits: relative cursor
//! movement, erasure from the cursor down, and cursor visibility.
//! Everything writes to a generic `W: Write` so render paths can be
//! tested against in-memory buffers.

use std::io::{self, Write};

/// Move cursor up by `n` rows. No-op for `n == 0`.
#[inline]
pub fn cursor_up<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    if n > 0 { write!(w, "\x1b[{}A", n) } else { Ok(()) }
}

/// Move cursor right by `n` columns. No-op for `n == 0`.
#[inline]
pub fn cursor_forward<W: Write>(w: &mut W, n: usize) -> io::Result<()> {
    if n > 0 { write!(w, "\x1b[{}C", n) } else { Ok(()) }
}

/// Move cursor to column zero (carriage return).
#[inline]
pub fn cursor_column_zero<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\r")
}

/// Erase from the cursor to the end of the screen.
#[inline]
pub fn erase_down<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[J")
}

/// Erase from the cursor to the end of the line.
#[inline]
pub fn erase_to_eol<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

/// Hide the cursor.
#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor.
#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn movement() {
        assert_eq!(capture(|w| cursor_up(w, 3)), "\x1b[3A");
        assert_eq!(capture(|w| cursor_up(w, 0)), "");
        assert_eq!(capture(|w| cursor_forward(w, 7)), "\x1b[7C");
        assert_eq!(capture(|w| cursor_column_zero(w)), "\r");
    }

    #[test]
    fn erasure() {
        assert_eq!(capture(|w| erase_down(w)), "\x1b[J");
        assert_eq!(capture(|w| erase_to_eol(w)), "\x1b[K");
    }

    #[test]
    fn visibility() {
        assert_eq!(capture(|w| cursor_hide(w)), "\x1b[?25l");
        assert_eq!(capture(|w| cursor_show(w)), "\x1b[?25h");
    }
}
