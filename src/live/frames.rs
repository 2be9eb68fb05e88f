//! Animation frame tables.
//!
//! Each set pairs an ordered glyph list with its tick interval. Sets
//! are addressed by name so embedders can pick one from configuration
//! without importing statics.

use std::time::Duration;

/// A named spinner animation: glyphs plus tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSet {
    pub name: &'static str,
    pub frames: &'static [&'static str],
    pub interval_ms: u64,
}

impl FrameSet {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

pub static DOTS: FrameSet = FrameSet {
    name: "dots",
    frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
    interval_ms: 80,
};

pub static LINE: FrameSet = FrameSet {
    name: "line",
    frames: &["-", "\\", "|", "/"],
    interval_ms: 130,
};

pub static ARC: FrameSet = FrameSet {
    name: "arc",
    frames: &["◜", "◠", "◝", "◞", "◡", "◟"],
    interval_ms: 100,
};

pub static BOUNCE: FrameSet = FrameSet {
    name: "bounce",
    frames: &["∙∙∙", "●∙∙", "∙●∙", "∙∙●", "∙∙∙"],
    interval_ms: 120,
};

static ALL: &[&FrameSet] = &[&DOTS, &LINE, &ARC, &BOUNCE];

/// Look up a frame set by name.
pub fn by_name(name: &str) -> Option<&'static FrameSet> {
    ALL.iter().copied().find(|set| set.name == name)
}

/// The set used when none is specified.
pub fn default_set() -> &'static FrameSet {
    &DOTS
}
