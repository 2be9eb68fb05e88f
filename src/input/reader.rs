//! Chunked raw stdin reads with an optional timeout.
//!
//! In raw mode a read returns whatever bytes the terminal has
//! delivered so far — one keystroke, an escape sequence, or a burst of
//! pasted text. The timeout lets a caller's loop wake for animation
//! deadlines while it waits for the next keystroke.

use std::io::{self, Read};
use std::time::Duration;

/// Result of one read attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Raw bytes, lossily decoded as UTF-8 text.
    Data(String),
    /// stdin reached end of input.
    Eof,
    /// The timeout elapsed with no input.
    TimedOut,
}

/// Reader over the process stdin.
pub struct RawReader {
    buf: [u8; 256],
}

impl RawReader {
    pub fn new() -> Self {
        Self { buf: [0; 256] }
    }

    /// Wait for input, up to `timeout` (`None` blocks indefinitely).
    ///
    /// An interrupted wait reports as [`Chunk::TimedOut`] so the
    /// caller re-polls with fresh deadlines after a signal.
    pub fn read_chunk(&mut self, timeout: Option<Duration>) -> io::Result<Chunk> {
        if !self.wait_readable(timeout)? {
            return Ok(Chunk::TimedOut);
        }
        match io::stdin().lock().read(&mut self.buf) {
            Ok(0) => Ok(Chunk::Eof),
            Ok(n) => Ok(Chunk::Data(
                String::from_utf8_lossy(&self.buf[..n]).into_owned(),
            )),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Chunk::TimedOut),
            Err(e) => Err(e),
        }
    }

    /// Block until stdin is readable or the timeout elapses.
    #[cfg(unix)]
    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        let mut fds = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let millis = match timeout {
            Some(t) => t.as_millis().min(i32::MAX as u128) as i32,
            None => -1,
        };
        let ret = unsafe { libc::poll(&mut fds, 1, millis) };
        match ret {
            -1 => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    Ok(false)
                } else {
                    Err(err)
                }
            }
            0 => Ok(false),
            _ => Ok(true),
        }
    }

    /// Without poll(2), reads just block; timeouts are best-effort.
    #[cfg(not(unix))]
    fn wait_readable(&self, _timeout: Option<Duration>) -> io::Result<bool> {
        Ok(true)
    }
}

impl Default for RawReader {
    fn default() -> Self {
        Self::new()
    }
}
