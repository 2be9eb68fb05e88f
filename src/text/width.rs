//! Terminal cell width of characters, graphemes, and strings.
//!
//! Built on `unicode-width` (East Asian Width tables) and
//! `unicode-segmentation` (grapheme cluster boundaries), with explicit
//! handling for emoji sequences that terminals render two cells wide.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi::strip_ansi;

/// Cell width of a single codepoint.
///
/// `0` for control and zero-width characters, `2` for wide characters
/// and common emoji ranges, `1` otherwise.
#[inline]
pub fn char_width(c: char) -> usize {
    match c as u32 {
        // Symbol/emoji blocks most terminals draw double-width even
        // when East Asian Width says otherwise.
        0x2600..=0x27BF => 2,
        0x1F300..=0x1F5FF => 2,
        0x1F600..=0x1F64F => 2,
        0x1F680..=0x1F6FF => 2,
        0x1F900..=0x1F9FF => 2,
        0x1FA70..=0x1FAFF => 2,
        _ => c.width().unwrap_or(0),
    }
}

/// Cell width of one grapheme cluster.
///
/// Multi-codepoint clusters that form an emoji sequence (ZWJ families,
/// skin tones, flags, keycaps) count as 2; a base character with
/// combining marks counts as the base alone.
pub fn grapheme_width(grapheme: &str) -> usize {
    let mut chars = grapheme.chars();
    let Some(first) = chars.next() else {
        return 0;
    };

    if grapheme.len() == first.len_utf8() {
        return char_width(first);
    }

    // Regional indicator pair (flag).
    if (0x1F1E6..=0x1F1FF).contains(&(first as u32)) {
        return 2;
    }

    for c in chars {
        match c as u32 {
            0x200D => return 2,            // zero-width joiner
            0xFE0F => return 2,            // VS16 emoji presentation
            0x1F3FB..=0x1F3FF => return 2, // skin tone modifier
            0x20E3 => return 2,            // enclosing keycap
            _ => {}
        }
    }

    first.width().unwrap_or(0)
}

/// Rendered cell width of a string, embedded escape sequences ignored.
pub fn string_width(s: &str) -> usize {
    if s.is_empty() {
        return 0;
    }

    // ASCII without escapes: count printable bytes, no allocation.
    if s.is_ascii() && !s.as_bytes().contains(&0x1B) {
        return s.bytes().filter(|&b| (0x20..0x7F).contains(&b)).count();
    }

    let plain = strip_ansi(s);
    plain.graphemes(true).map(grapheme_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii() {
        assert_eq!(string_width(""), 0);
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width("a b"), 3);
    }

    #[test]
    fn control_bytes_zero() {
        assert_eq!(char_width('\t'), 0);
        assert_eq!(char_width('\x07'), 0);
    }

    #[test]
    fn cjk_double() {
        assert_eq!(string_width("日本語"), 6);
        assert_eq!(char_width('日'), 2);
    }

    #[test]
    fn styled_text_measures_plain() {
        assert_eq!(string_width("\x1b[31mred\x1b[0m"), 3);
    }

    #[test]
    fn combining_mark() {
        // e + combining acute = one cell.
        assert_eq!(string_width("e\u{0301}"), 1);
    }

    #[test]
    fn emoji_sequences() {
        assert_eq!(grapheme_width("🚀"), 2);
        assert_eq!(grapheme_width("👍🏽"), 2);
        assert_eq!(grapheme_width("🇺🇸"), 2);
        assert_eq!(grapheme_width("👨\u{200D}👩\u{200D}👧"), 2);
    }

    #[test]
    fn mixed_string() {
        assert_eq!(string_width("ok 日本 🚀"), 3 + 4 + 1 + 2);
    }
}
