//! Raw input chunk → structured key event.
//!
//! One chunk, one event: if the terminal delivered several keys in a
//! single read they travel together as one literal sequence. Decoding
//! never fails — anything unrecognized degrades to a literal key whose
//! name is the sequence itself.
//!
//! Precedence: bytes 1–26 always decode as a control chord
//! (`chr(byte + 96)` + CTRL), even where a named mapping exists for
//! the same byte. 0x0D is `ctrl+m`, 0x09 is `ctrl+i`; the editor binds
//! the chords, so enter and tab behave as expected downstream.

bitflags::bitflags! {
    /// Key modifier flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Modifier: u8 {
        const CTRL  = 1 << 0;
        const SHIFT = 1 << 1;
        const META  = 1 << 2;
    }
}

/// A decoded key.
///
/// `literal` is empty for anything non-printable: named keys, control
/// chords, and meta chords. `raw` always carries the original chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub name: String,
    pub literal: String,
    pub modifiers: Modifier,
    pub raw: String,
}

impl KeyEvent {
    /// True for the plain named key (no modifiers).
    pub fn is(&self, name: &str) -> bool {
        self.name == name && self.modifiers.is_empty()
    }

    /// True for a CTRL chord on `letter`.
    pub fn is_ctrl(&self, letter: char) -> bool {
        self.modifiers.contains(Modifier::CTRL) && self.name.len() == 1 && self.name.starts_with(letter)
    }

    /// True for a META chord on `letter`.
    pub fn is_meta(&self, letter: char) -> bool {
        self.modifiers.contains(Modifier::META) && self.name.len() == 1 && self.name.starts_with(letter)
    }
}

/// Named multi-byte sequences: arrows, navigation, editing, F1–F12.
///
/// Single control bytes never reach this table; the control-chord rule
/// wins for those.
const SEQUENCES: &[(&str, &str)] = &[
    ("\x1b[A", "up"),
    ("\x1b[B", "down"),
    ("\x1b[C", "right"),
    ("\x1b[D", "left"),
    ("\x1bOA", "up"),
    ("\x1bOB", "down"),
    ("\x1bOC", "right"),
    ("\x1bOD", "left"),
    ("\x1b[H", "home"),
    ("\x1b[F", "end"),
    ("\x1bOH", "home"),
    ("\x1bOF", "end"),
    ("\x1b[1~", "home"),
    ("\x1b[2~", "insert"),
    ("\x1b[3~", "delete"),
    ("\x1b[4~", "end"),
    ("\x1b[5~", "pageup"),
    ("\x1b[6~", "pagedown"),
    ("\x1bOP", "f1"),
    ("\x1bOQ", "f2"),
    ("\x1bOR", "f3"),
    ("\x1bOS", "f4"),
    ("\x1b[11~", "f1"),
    ("\x1b[12~", "f2"),
    ("\x1b[13~", "f3"),
    ("\x1b[14~", "f4"),
    ("\x1b[15~", "f5"),
    ("\x1b[17~", "f6"),
    ("\x1b[18~", "f7"),
    ("\x1b[19~", "f8"),
    ("\x1b[20~", "f9"),
    ("\x1b[21~", "f10"),
    ("\x1b[23~", "f11"),
    ("\x1b[24~", "f12"),
];

/// Decode one raw input chunk.
pub fn decode(chunk: &str) -> KeyEvent {
    let bytes = chunk.as_bytes();

    // Control chord: single byte 1–26.
    if bytes.len() == 1 && (0x01..=0x1A).contains(&bytes[0]) {
        return KeyEvent {
            name: ((bytes[0] + 96) as char).to_string(),
            literal: String::new(),
            modifiers: Modifier::CTRL,
            raw: chunk.to_string(),
        };
    }

    // Remaining single-byte specials.
    if bytes.len() == 1 {
        let name = match bytes[0] {
            0x7F => Some("backspace"),
            0x1B => Some("escape"),
            0x00 => Some("null"),
            _ => None,
        };
        if let Some(name) = name {
            return named(name, chunk);
        }
    }

    // Shift+Tab arrives as its own CSI.
    if chunk == "\x1b[Z" {
        return KeyEvent {
            name: "tab".to_string(),
            literal: String::new(),
            modifiers: Modifier::SHIFT,
            raw: chunk.to_string(),
        };
    }

    if let Some((_, name)) = SEQUENCES.iter().find(|(seq, _)| *seq == chunk) {
        return named(name, chunk);
    }

    // Meta chord: ESC + something that is not a CSI/SS3 introducer.
    let mut chars = chunk.chars();
    if bytes.len() > 1 && bytes[0] == 0x1B && bytes[1] != b'[' && bytes[1] != b'O' {
        chars.next();
        if let Some(key) = chars.next() {
            let mut modifiers = Modifier::META;
            let name = if key == '\u{7f}' {
                "backspace".to_string()
            } else if key.is_alphabetic() && key.is_uppercase() {
                modifiers |= Modifier::SHIFT;
                key.to_lowercase().to_string()
            } else {
                key.to_string()
            };
            return KeyEvent {
                name,
                literal: String::new(),
                modifiers,
                raw: chunk.to_string(),
            };
        }
    }

    // Literal fallthrough: the sequence is the key.
    let mut modifiers = Modifier::empty();
    let mut chars = chunk.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_alphabetic() && c.is_uppercase() {
            modifiers |= Modifier::SHIFT;
        }
    }
    KeyEvent {
        name: chunk.to_string(),
        literal: chunk.to_string(),
        modifiers,
        raw: chunk.to_string(),
    }
}

fn named(name: &str, raw: &str) -> KeyEvent {
    KeyEvent {
        name: name.to_string(),
        literal: String::new(),
        modifiers: Modifier::empty(),
        raw: raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_literal() {
        let ev = decode("a");
        assert_eq!(ev.name, "a");
        assert_eq!(ev.literal, "a");
        assert!(ev.modifiers.is_empty());
        assert_eq!(ev.raw, "a");
    }

    #[test]
    fn shift_inferred_from_case() {
        let ev = decode("A");
        assert_eq!(ev.name, "A");
        assert!(ev.modifiers.contains(Modifier::SHIFT));
        assert!(!decode("7").modifiers.contains(Modifier::SHIFT));
    }

    #[test]
    fn control_chord() {
        let ev = decode("\x03");
        assert_eq!(ev.name, "c");
        assert_eq!(ev.literal, "");
        assert_eq!(ev.modifiers, Modifier::CTRL);
        assert!(ev.is_ctrl('c'));
    }

    #[test]
    fn control_chord_wins_over_named_keys() {
        // 0x0D is carriage return and ctrl+m; the chord wins.
        let enter = decode("\r");
        assert_eq!(enter.name, "m");
        assert_eq!(enter.modifiers, Modifier::CTRL);

        // 0x09 is tab and ctrl+i; the chord wins.
        let tab = decode("\t");
        assert_eq!(tab.name, "i");
        assert_eq!(tab.modifiers, Modifier::CTRL);
    }

    #[test]
    fn every_control_byte_maps_to_a_letter() {
        for b in 0x01..=0x1Au8 {
            let chunk = (b as char).to_string();
            let ev = decode(&chunk);
            assert_eq!(ev.name, ((b + 96) as char).to_string());
            assert_eq!(ev.modifiers, Modifier::CTRL);
            assert_eq!(ev.literal, "");
        }
    }

    #[test]
    fn arrows_and_navigation() {
        assert!(decode("\x1b[A").is("up"));
        assert!(decode("\x1b[B").is("down"));
        assert!(decode("\x1bOC").is("right"));
        assert!(decode("\x1b[3~").is("delete"));
        assert!(decode("\x1b[5~").is("pageup"));
        assert!(decode("\x1b[F").is("end"));
    }

    #[test]
    fn function_keys() {
        assert!(decode("\x1bOP").is("f1"));
        assert!(decode("\x1b[15~").is("f5"));
        assert!(decode("\x1b[24~").is("f12"));
    }

    #[test]
    fn shift_tab() {
        let ev = decode("\x1b[Z");
        assert_eq!(ev.name, "tab");
        assert_eq!(ev.modifiers, Modifier::SHIFT);
    }

    #[test]
    fn meta_chord() {
        let ev = decode("\x1bf");
        assert_eq!(ev.name, "f");
        assert_eq!(ev.literal, "");
        assert_eq!(ev.modifiers, Modifier::META);
        assert!(ev.is_meta('f'));
    }

    #[test]
    fn meta_uppercase_adds_shift() {
        let ev = decode("\x1bF");
        assert_eq!(ev.name, "f");
        assert_eq!(ev.modifiers, Modifier::META | Modifier::SHIFT);
    }

    #[test]
    fn meta_backspace_named() {
        let ev = decode("\x1b\x7f");
        assert_eq!(ev.name, "backspace");
        assert_eq!(ev.modifiers, Modifier::META);
    }

    #[test]
    fn backspace_and_escape() {
        assert!(decode("\x7f").is("backspace"));
        assert!(decode("\x1b").is("escape"));
    }

    #[test]
    fn unknown_sequence_degrades_to_literal() {
        let ev = decode("\x1b[1;5C");
        assert_eq!(ev.name, "\x1b[1;5C");
        assert_eq!(ev.literal, "\x1b[1;5C");
        assert_eq!(ev.raw, "\x1b[1;5C");
    }

    #[test]
    fn multibyte_utf8_literal() {
        let ev = decode("é");
        assert_eq!(ev.name, "é");
        assert_eq!(ev.literal, "é");
    }

    #[test]
    fn pasted_text_stays_one_literal() {
        let ev = decode("hello");
        assert_eq!(ev.literal, "hello");
        assert!(ev.modifiers.is_empty());
    }
}
