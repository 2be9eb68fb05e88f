//! Live regions: animated inline content that freezes into scrollback.
//!
//! A [`Spinner`] is a single animated line; a [`Section`] adds
//! incrementally appended sub-items beneath a title. Both redraw in
//! place on a repeating deadline and end by writing their final
//! content permanently, after which they are inert.
//!
//! Ticking is poll-driven: the owner's loop calls [`Spinner::poll`]
//! when [`Spinner::next_deadline`] elapses. Every erase→redraw pair
//! runs synchronously inside one call, so a region can never interleave
//! mid-cycle with keystroke redraws sharing the stream.
//!
//! While any region is animating the real cursor is hidden through the
//! process-wide [`CursorGuard`] count and restored when the last one
//! ends.

pub mod frames;

pub use frames::FrameSet;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crate::render::cursor::block_rows;
use crate::render::{OutputBuffer, ansi};
use crate::style::Style;
use crate::terminal::{CursorGuard, SharedTerminal};

// =============================================================================
// Footer
// =============================================================================

/// Content an owner pins beneath a live region.
///
/// `render` is queried on every tick; `on_end` fires exactly once when
/// the region freezes so the owner can redraw its own pinned zone.
pub struct Footer {
    pub render: Box<dyn FnMut() -> Vec<String>>,
    pub on_end: Box<dyn FnMut() -> io::Result<()>>,
}

// =============================================================================
// Shared core
// =============================================================================

/// State common to both region shapes: frame clock, freeze latch,
/// previous-draw bookkeeping, footer, cursor hold.
struct LiveCore {
    term: SharedTerminal,
    frames: &'static FrameSet,
    frame_index: usize,
    started: Instant,
    last_tick: Option<Instant>,
    frozen: bool,
    footer: Option<Footer>,
    prev_rows: usize,
    guard: Option<CursorGuard>,
}

impl LiveCore {
    fn new(
        term: &SharedTerminal,
        frames: &'static FrameSet,
        footer: Option<Footer>,
    ) -> io::Result<Self> {
        let guard = if term.borrow().is_interactive() {
            Some(CursorGuard::acquire(term)?)
        } else {
            None
        };
        Ok(Self {
            term: term.clone(),
            frames,
            frame_index: 0,
            started: Instant::now(),
            last_tick: None,
            frozen: false,
            footer,
            prev_rows: 0,
            guard,
        })
    }

    fn interactive(&self) -> bool {
        self.term.borrow().is_interactive()
    }

    fn glyph(&self) -> &'static str {
        self.frames.frames[self.frame_index % self.frames.frames.len()]
    }

    fn due(&self) -> bool {
        match self.last_tick {
            None => true,
            Some(t) => t.elapsed() >= self.frames.interval(),
        }
    }

    fn next_deadline(&self) -> Option<Duration> {
        if self.frozen {
            return None;
        }
        match self.last_tick {
            None => Some(Duration::ZERO),
            Some(t) => Some(self.frames.interval().saturating_sub(t.elapsed())),
        }
    }

    /// Erase the previous block and draw `lines` plus the footer.
    fn draw(&mut self, mut lines: Vec<String>) -> io::Result<()> {
        if !self.interactive() || self.frozen {
            return Ok(());
        }
        if let Some(footer) = &mut self.footer {
            lines.extend((footer.render)());
        }

        let (cols, nl) = {
            let t = self.term.borrow();
            (t.columns(), if t.is_raw() { "\r\n" } else { "\n" })
        };
        let mut out = OutputBuffer::new();
        self.erase_into(&mut out)?;
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                out.write_str(nl);
            }
            out.write_str(line);
        }

        let mut t = self.term.borrow_mut();
        out.flush_to(&mut *t)?;
        self.prev_rows = block_rows(&lines, cols);
        Ok(())
    }

    /// Queue erasure of the previously drawn block. The cursor rests
    /// at the end of the block's last line, so climb `rows - 1`.
    fn erase_into(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        if self.prev_rows > 0 {
            ansi::cursor_up(out, self.prev_rows - 1)?;
            ansi::cursor_column_zero(out)?;
            ansi::erase_down(out)?;
            self.prev_rows = 0;
        }
        Ok(())
    }

    /// One-way transition to frozen: erase, write `final_lines`
    /// permanently, release the cursor hold, fire the footer
    /// end-callback. Idempotent.
    fn freeze(&mut self, final_lines: Vec<String>) -> io::Result<()> {
        if self.frozen {
            return Ok(());
        }
        self.frozen = true;

        let nl = if self.term.borrow().is_raw() { "\r\n" } else { "\n" };
        let mut out = OutputBuffer::new();
        if self.interactive() {
            self.erase_into(&mut out)?;
        }
        for line in &final_lines {
            out.write_str(line);
            out.write_str(nl);
        }
        {
            let mut t = self.term.borrow_mut();
            out.flush_to(&mut *t)?;
        }

        self.guard = None;
        if let Some(mut footer) = self.footer.take() {
            (footer.on_end)()?;
        }
        Ok(())
    }

    /// Plain line output for non-interactive streams.
    fn print_plain(&mut self, line: &str) -> io::Result<()> {
        let mut t = self.term.borrow_mut();
        t.write_all(line.as_bytes())?;
        t.write_all(b"\n")?;
        t.flush()
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

// =============================================================================
// Spinner (single line)
// =============================================================================

pub struct SpinnerOptions {
    pub frames: &'static FrameSet,
    pub footer: Option<Footer>,
}

impl Default for SpinnerOptions {
    fn default() -> Self {
        Self {
            frames: frames::default_set(),
            footer: None,
        }
    }
}

/// A single-line animated region.
pub struct Spinner {
    core: LiveCore,
    text: String,
}

impl Spinner {
    /// Start animating. Non-interactive: prints the text once instead.
    pub fn start(term: &SharedTerminal, text: &str, options: SpinnerOptions) -> io::Result<Self> {
        let mut spinner = Self {
            core: LiveCore::new(term, options.frames, options.footer)?,
            text: text.to_string(),
        };
        if spinner.core.interactive() {
            spinner.tick()?;
        } else {
            spinner.core.print_plain(text)?;
        }
        Ok(spinner)
    }

    /// Replace the message and redraw on the current frame.
    pub fn update(&mut self, text: &str) -> io::Result<()> {
        if self.core.frozen {
            return Ok(());
        }
        self.text = text.to_string();
        if self.core.interactive() {
            self.draw_frame()
        } else {
            self.core.print_plain(text)
        }
    }

    /// Advance one frame and redraw, resetting the tick clock.
    pub fn tick(&mut self) -> io::Result<()> {
        if self.core.frozen || !self.core.interactive() {
            return Ok(());
        }
        self.draw_frame()?;
        self.core.frame_index += 1;
        self.core.last_tick = Some(Instant::now());
        Ok(())
    }

    /// Tick if the interval has elapsed. Returns whether it drew.
    pub fn poll(&mut self) -> io::Result<bool> {
        if self.core.frozen || !self.core.interactive() || !self.core.due() {
            return Ok(false);
        }
        self.tick()?;
        Ok(true)
    }

    /// Time until the next tick is due; `None` once frozen.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.core.next_deadline()
    }

    pub fn elapsed(&self) -> Duration {
        self.core.elapsed()
    }

    pub fn is_frozen(&self) -> bool {
        self.core.frozen
    }

    fn draw_frame(&mut self) -> io::Result<()> {
        let line = format!("{} {}", self.core.glyph(), self.text);
        self.core.draw(vec![line])
    }

    /// Freeze with an arbitrary icon and optional style.
    ///
    /// The first call wins; later calls (any variant) are no-ops.
    pub fn stop(&mut self, icon: &str, message: Option<&str>, style: Option<Style>) -> io::Result<()> {
        let text = message.unwrap_or(&self.text).to_string();
        let interactive = self.core.interactive();
        let icon = match style {
            Some(style) => style.apply_if(interactive, icon),
            None => icon.to_string(),
        };
        self.core.freeze(vec![format!("{icon} {text}")])
    }

    pub fn done(&mut self, message: Option<&str>) -> io::Result<()> {
        self.stop("✔", message, Some(Style::new().green()))
    }

    pub fn fail(&mut self, message: Option<&str>) -> io::Result<()> {
        self.stop("✖", message, Some(Style::new().red()))
    }

    pub fn warn(&mut self, message: Option<&str>) -> io::Result<()> {
        self.stop("⚠", message, Some(Style::new().yellow()))
    }

    pub fn info(&mut self, message: Option<&str>) -> io::Result<()> {
        self.stop("ℹ", message, Some(Style::new().blue()))
    }
}

// =============================================================================
// Section (multi-line)
// =============================================================================

pub struct SectionOptions {
    pub frames: &'static FrameSet,
    pub footer: Option<Footer>,
    /// Hide the sub-items once the section freezes.
    pub collapse_on_done: bool,
}

impl Default for SectionOptions {
    fn default() -> Self {
        Self {
            frames: frames::default_set(),
            footer: None,
            collapse_on_done: false,
        }
    }
}

/// A multi-line animated region: a title plus appended sub-items.
pub struct Section {
    core: LiveCore,
    title: String,
    items: Vec<String>,
    collapse_on_done: bool,
}

impl Section {
    pub fn start(term: &SharedTerminal, title: &str, options: SectionOptions) -> io::Result<Self> {
        let mut section = Self {
            core: LiveCore::new(term, options.frames, options.footer)?,
            title: title.to_string(),
            items: Vec::new(),
            collapse_on_done: options.collapse_on_done,
        };
        if section.core.interactive() {
            section.tick()?;
        } else {
            section.core.print_plain(title)?;
        }
        Ok(section)
    }

    /// Append one sub-item beneath the title.
    pub fn push(&mut self, item: &str) -> io::Result<()> {
        if self.core.frozen {
            return Ok(());
        }
        self.items.push(item.to_string());
        if self.core.interactive() {
            self.draw_lines()
        } else {
            self.core.print_plain(&format!("  {item}"))
        }
    }

    pub fn update(&mut self, title: &str) -> io::Result<()> {
        if self.core.frozen {
            return Ok(());
        }
        self.title = title.to_string();
        if self.core.interactive() {
            self.draw_lines()
        } else {
            self.core.print_plain(title)
        }
    }

    pub fn tick(&mut self) -> io::Result<()> {
        if self.core.frozen || !self.core.interactive() {
            return Ok(());
        }
        self.draw_lines()?;
        self.core.frame_index += 1;
        self.core.last_tick = Some(Instant::now());
        Ok(())
    }

    pub fn poll(&mut self) -> io::Result<bool> {
        if self.core.frozen || !self.core.interactive() || !self.core.due() {
            return Ok(false);
        }
        self.tick()?;
        Ok(true)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.core.next_deadline()
    }

    pub fn is_frozen(&self) -> bool {
        self.core.frozen
    }

    fn lines(&self, icon: &str) -> Vec<String> {
        let mut lines = vec![format!("{icon} {}", self.title)];
        for item in &self.items {
            lines.push(format!("  {item}"));
        }
        lines
    }

    fn draw_lines(&mut self) -> io::Result<()> {
        let lines = self.lines(self.core.glyph());
        self.core.draw(lines)
    }

    pub fn stop(&mut self, icon: &str, message: Option<&str>, style: Option<Style>) -> io::Result<()> {
        if let Some(message) = message {
            self.title = message.to_string();
        }
        let interactive = self.core.interactive();
        let icon = match style {
            Some(style) => style.apply_if(interactive, icon),
            None => icon.to_string(),
        };
        let final_lines = if self.collapse_on_done {
            vec![format!("{icon} {}", self.title)]
        } else {
            self.lines(&icon)
        };
        self.core.freeze(final_lines)
    }

    pub fn done(&mut self, message: Option<&str>) -> io::Result<()> {
        self.stop("✔", message, Some(Style::new().green()))
    }

    pub fn fail(&mut self, message: Option<&str>) -> io::Result<()> {
        self.stop("✖", message, Some(Style::new().red()))
    }

    pub fn warn(&mut self, message: Option<&str>) -> io::Result<()> {
        self.stop("⚠", message, Some(Style::new().yellow()))
    }

    pub fn info(&mut self, message: Option<&str>) -> io::Result<()> {
        self.stop("ℹ", message, Some(Style::new().blue()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::terminal::{test_pipe, test_terminal};
    use crate::text::strip_ansi;

    #[test]
    fn first_frame_draws_glyph_and_text() {
        let (term, sink) = test_terminal(80);
        let _spinner = Spinner::start(&term, "loading", SpinnerOptions::default()).unwrap();
        let plain = strip_ansi(&sink.contents()).into_owned();
        assert!(plain.contains("⠋ loading"), "got: {plain:?}");
    }

    #[test]
    fn tick_advances_frame_and_erases() {
        let (term, sink) = test_terminal(80);
        let mut spinner = Spinner::start(&term, "x", SpinnerOptions::default()).unwrap();
        sink.clear();
        spinner.tick().unwrap();
        let written = sink.contents();
        // Single-row block: carriage return + erase-down, next glyph.
        assert!(written.starts_with("\r\x1b[J"), "got: {written:?}");
        assert!(written.contains("⠙ x"));
    }

    #[test]
    fn done_writes_final_line_once() {
        let (term, sink) = test_terminal(80);
        let mut spinner = Spinner::start(&term, "job", SpinnerOptions::default()).unwrap();
        spinner.done(Some("ok")).unwrap();
        let after_first = sink.contents();
        assert!(strip_ansi(&after_first).contains("✔ ok\n"));

        spinner.done(Some("again")).unwrap();
        spinner.fail(Some("nope")).unwrap();
        assert_eq!(sink.contents(), after_first, "freeze must be idempotent");
    }

    #[test]
    fn update_after_freeze_is_ignored() {
        let (term, sink) = test_terminal(80);
        let mut spinner = Spinner::start(&term, "a", SpinnerOptions::default()).unwrap();
        spinner.done(None).unwrap();
        let frozen = sink.contents();
        spinner.update("b").unwrap();
        spinner.tick().unwrap();
        assert_eq!(sink.contents(), frozen);
        assert!(spinner.next_deadline().is_none());
    }

    #[test]
    fn footer_rendered_each_tick_and_end_fires_once() {
        let (term, sink) = test_terminal(80);
        let ended = Rc::new(Cell::new(0u32));
        let ended_probe = ended.clone();
        let footer = Footer {
            render: Box::new(|| vec!["---".to_string()]),
            on_end: Box::new(move || {
                ended_probe.set(ended_probe.get() + 1);
                Ok(())
            }),
        };
        let mut spinner = Spinner::start(
            &term,
            "work",
            SpinnerOptions {
                footer: Some(footer),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(sink.contents().contains("\n---"));

        spinner.tick().unwrap();
        assert_eq!(ended.get(), 0);

        spinner.done(Some("ok")).unwrap();
        assert_eq!(ended.get(), 1);
        // Final content excludes the footer; the owner redraws it.
        let tail = sink.contents();
        let last_write = tail.rsplit("\x1b[J").next().unwrap();
        assert!(!last_write.contains("---"), "got: {last_write:?}");

        spinner.done(None).unwrap();
        assert_eq!(ended.get(), 1, "end callback must fire exactly once");
    }

    #[test]
    fn multi_row_erase_counts_footer_rows() {
        let (term, sink) = test_terminal(80);
        let footer = Footer {
            render: Box::new(|| vec!["f1".to_string(), "f2".to_string()]),
            on_end: Box::new(|| Ok(())),
        };
        let mut spinner = Spinner::start(
            &term,
            "t",
            SpinnerOptions {
                footer: Some(footer),
                ..Default::default()
            },
        )
        .unwrap();
        sink.clear();
        spinner.tick().unwrap();
        // Three rows drawn previously: climb two, then erase down.
        assert!(sink.contents().starts_with("\x1b[2A\r\x1b[J"));
    }

    #[test]
    fn section_appends_items_below_title() {
        let (term, sink) = test_terminal(80);
        let mut section = Section::start(&term, "build", SectionOptions::default()).unwrap();
        section.push("compile").unwrap();
        section.push("link").unwrap();
        let plain = strip_ansi(&sink.contents()).into_owned();
        assert!(plain.contains("build\n  compile\n  link"));
    }

    #[test]
    fn section_collapse_hides_items_on_done() {
        let (term, sink) = test_terminal(80);
        let mut section = Section::start(
            &term,
            "steps",
            SectionOptions {
                collapse_on_done: true,
                ..Default::default()
            },
        )
        .unwrap();
        section.push("one").unwrap();
        section.done(Some("all good")).unwrap();
        let final_write = sink.contents();
        let tail = final_write.rsplit("\x1b[J").next().unwrap();
        assert!(strip_ansi(tail).contains("✔ all good\n"));
        assert!(!tail.contains("one"));
    }

    #[test]
    fn section_keeps_items_without_collapse() {
        let (term, sink) = test_terminal(80);
        let mut section = Section::start(&term, "steps", SectionOptions::default()).unwrap();
        section.push("one").unwrap();
        section.done(None).unwrap();
        let tail = sink.contents();
        let last = tail.rsplit("\x1b[J").next().unwrap();
        assert!(last.contains("  one"));
    }

    #[test]
    fn non_interactive_prints_transitions_only() {
        let (term, sink) = test_pipe(80);
        let mut spinner = Spinner::start(&term, "fetch", SpinnerOptions::default()).unwrap();
        spinner.tick().unwrap();
        spinner.poll().unwrap();
        spinner.update("fetch 50%").unwrap();
        spinner.done(Some("fetched")).unwrap();
        assert_eq!(sink.contents(), "fetch\nfetch 50%\n✔ fetched\n");
        assert!(!sink.contents().contains('\x1b'));
    }

    #[test]
    fn deadline_counts_down() {
        let (term, _sink) = test_terminal(80);
        let mut spinner = Spinner::start(&term, "x", SpinnerOptions::default()).unwrap();
        let deadline = spinner.next_deadline().unwrap();
        assert!(deadline <= frames::default_set().interval());
        assert!(!spinner.poll().unwrap(), "interval has not elapsed yet");
        spinner.done(None).unwrap();
        assert!(spinner.next_deadline().is_none());
    }
}
