//! Composable text styling as an explicit value-type builder.
//!
//! A [`Style`] is an ordered list of `(open, close)` SGR code pairs.
//! Chained methods return a new value with one more pair; applying a
//! style concatenates the opens, the text, then the closes in reverse
//! order so nested attributes unwind correctly.
//!
//! ```
//! use shoreline::style::Style;
//! let s = Style::new().bold().cyan();
//! assert_eq!(s.apply("hi"), "\x1b[1m\x1b[36mhi\x1b[39m\x1b[22m");
//! ```

/// An immutable chain of SGR code pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    codes: Vec<(&'static str, &'static str)>,
}

macro_rules! sgr {
    ($(#[$doc:meta])* $name:ident, $open:literal, $close:literal) => {
        $(#[$doc])*
        pub fn $name(mut self) -> Self {
            self.codes.push((concat!("\x1b[", $open, "m"), concat!("\x1b[", $close, "m")));
            self
        }
    };
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no attributes have been chained.
    pub fn is_plain(&self) -> bool {
        self.codes.is_empty()
    }

    sgr!(bold, "1", "22");
    sgr!(dim, "2", "22");
    sgr!(italic, "3", "23");
    sgr!(underline, "4", "24");
    sgr!(inverse, "7", "27");
    sgr!(strikethrough, "9", "29");

    sgr!(red, "31", "39");
    sgr!(green, "32", "39");
    sgr!(yellow, "33", "39");
    sgr!(blue, "34", "39");
    sgr!(magenta, "35", "39");
    sgr!(cyan, "36", "39");
    sgr!(white, "37", "39");
    sgr!(gray, "90", "39");

    /// Wrap `text` in the accumulated codes.
    pub fn apply(&self, text: &str) -> String {
        if self.codes.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + self.codes.len() * 10);
        for (open, _) in &self.codes {
            out.push_str(open);
        }
        out.push_str(text);
        for (_, close) in self.codes.iter().rev() {
            out.push_str(close);
        }
        out
    }

    /// Apply only when `enabled`; plain text otherwise.
    ///
    /// Call sites pass the terminal's interactivity so piped output
    /// stays free of escape codes.
    pub fn apply_if(&self, enabled: bool, text: &str) -> String {
        if enabled {
            self.apply(text)
        } else {
            text.to_string()
        }
    }
}
