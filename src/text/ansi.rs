//! ANSI escape sequence stripping.
//!
//! Embedded escape sequences render at zero width, so they must be
//! removed before measuring. Piped (non-interactive) output also runs
//! through this to produce plain text.
//!
//! Recognized forms:
//! - CSI: `ESC [` params/intermediates, final byte 0x40-0x7E
//! - OSC: `ESC ]` payload, terminated by BEL or ST (`ESC \`)
//! - DCS / PM / APC: `ESC P` / `ESC ^` / `ESC _`, terminated by ST
//! - Two-character: `ESC` + one char

use std::borrow::Cow;

const ESC: u8 = 0x1B;

/// Remove ANSI escape sequences from a string.
///
/// Borrows when the input contains no ESC byte, allocates otherwise.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    if !s.as_bytes().contains(&ESC) {
        return Cow::Borrowed(s);
    }

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == ESC {
            i = skip_sequence(bytes, i);
        } else {
            // ESC is single-byte ASCII, so slicing at ESC boundaries
            // never splits a UTF-8 sequence.
            let start = i;
            while i < bytes.len() && bytes[i] != ESC {
                i += 1;
            }
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}

/// Skip one escape sequence; `pos` points at the ESC byte.
/// Returns the index just past the sequence.
fn skip_sequence(bytes: &[u8], pos: usize) -> usize {
    match bytes.get(pos + 1) {
        None => bytes.len(),
        Some(b'[') => skip_csi(bytes, pos + 2),
        Some(b']') | Some(b'P') | Some(b'^') | Some(b'_') => skip_until_st(bytes, pos + 2),
        Some(_) => pos + 2,
    }
}

/// Skip CSI body starting just after `ESC [`.
fn skip_csi(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        let b = bytes[i];
        if (0x40..=0x7E).contains(&b) {
            return i + 1;
        }
        if !(0x20..=0x3F).contains(&b) {
            // Stray byte inside the sequence; stop consuming.
            return i;
        }
        i += 1;
    }
    bytes.len()
}

/// Skip a string-style sequence body until BEL or ST.
fn skip_until_st(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            0x07 => return i + 1,
            ESC if bytes.get(i + 1) == Some(&b'\\') => return i + 2,
            _ => i += 1,
        }
    }
    bytes.len()
}
