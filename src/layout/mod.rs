//! Two-zone layout manager.
//!
//! Splits the terminal into a scrolling output zone and a pinned
//! active zone redrawn in place at the bottom. Permanent text goes
//! through [`Layout::print`] or [`Layout::write`], which erase the
//! active zone, emit the text into scrollback, and redraw the zone
//! beneath it.
//!
//! While a live region started through [`Layout::spinner`] or
//! [`Layout::section`] is animating, it owns the zone: the region
//! renders the zone as its footer every tick, the layout itself stops
//! drawing, and permanent output is queued until the region freezes.
//!
//! [`LayoutStrategy`] plugs the active zone into a line-editing
//! session, drawing the prompt as the top of the zone block with the
//! cursor parked inside it.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::editor::{RenderRequest, RenderStrategy};
use crate::live::{Footer, Section, SectionOptions, Spinner, SpinnerOptions};
use crate::render::cursor::{block_rows, move_to, target_position};
use crate::render::{OutputBuffer, ansi};
use crate::terminal::SharedTerminal;

/// Produces the active-zone lines on every redraw.
pub type ActiveRenderer = Box<dyn FnMut() -> Vec<String>>;

/// Clonable handle to one layout region.
#[derive(Clone)]
pub struct Layout(Rc<RefCell<Inner>>);

struct Inner {
    term: SharedTerminal,
    active: Option<ActiveRenderer>,
    /// Rows the drawn zone occupies; 0 when nothing is drawn.
    prev_rows: usize,
    /// Cursor position relative to the top of the drawn zone.
    cursor_row: usize,
    cursor_col: usize,
    /// Incomplete trailing segment from `write`, held until its
    /// newline arrives.
    partial: String,
    /// Output accepted while a live region owns the zone; flushed when
    /// the region ends.
    pending: String,
    live_depth: usize,
    closed: bool,
}

impl Inner {
    fn interactive(&self) -> bool {
        self.term.borrow().is_interactive()
    }

    fn line_end(&self) -> &'static str {
        if self.term.borrow().is_raw() { "\r\n" } else { "\n" }
    }

    fn flush(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        let mut t = self.term.borrow_mut();
        out.flush_to(&mut *t)
    }

    /// Queue erasure of the drawn zone: climb to its top row, return
    /// the carriage if the cursor is parked mid-line, clear downward.
    fn erase_into(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        if self.prev_rows > 0 {
            ansi::cursor_up(out, self.cursor_row)?;
            if self.cursor_col > 0 {
                ansi::cursor_column_zero(out)?;
            }
            ansi::erase_down(out)?;
            self.prev_rows = 0;
            self.cursor_row = 0;
            self.cursor_col = 0;
        }
        Ok(())
    }

    /// Queue the zone block, every line newline-terminated, then park
    /// the cursor at `cursor` within the block (bottom-left default).
    fn draw_block(
        &mut self,
        out: &mut OutputBuffer,
        lines: &[String],
        cursor: Option<(usize, usize)>,
    ) -> io::Result<()> {
        let cols = self.term.borrow().columns();
        let nl = self.line_end();
        for line in lines {
            out.write_str(line);
            out.write_str(nl);
        }
        let rows = block_rows(lines, cols);
        self.prev_rows = rows;
        self.cursor_row = rows;
        self.cursor_col = 0;
        if let Some((row, col)) = cursor {
            out.write_str(&move_to(rows, 0, row, col));
            self.cursor_row = row;
            self.cursor_col = col;
        }
        Ok(())
    }

    fn active_lines(&mut self) -> Vec<String> {
        if self.closed {
            return Vec::new();
        }
        match &mut self.active {
            Some(render) => render(),
            None => Vec::new(),
        }
    }

    /// Erase, re-invoke the stored renderer, draw.
    fn redraw(&mut self) -> io::Result<()> {
        if !self.interactive() || self.active.is_none() {
            return Ok(());
        }
        let lines = self.active_lines();
        let mut out = OutputBuffer::new();
        self.erase_into(&mut out)?;
        self.draw_block(&mut out, &lines, None)?;
        self.flush(&mut out)
    }

    /// Route permanent output: straight through when piped, queued
    /// while a live region animates, otherwise erase → text → redraw.
    fn emit(&mut self, text: &str) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        if !self.interactive() {
            let mut t = self.term.borrow_mut();
            t.write_all(text.as_bytes())?;
            return t.flush();
        }
        if self.live_depth > 0 {
            self.pending.push_str(text);
            return Ok(());
        }
        let lines = self.active_lines();
        let mut out = OutputBuffer::new();
        self.erase_into(&mut out)?;
        out.write_str(text);
        self.draw_block(&mut out, &lines, None)?;
        self.flush(&mut out)
    }
}

impl Layout {
    pub fn new(term: &SharedTerminal) -> Self {
        Self(Rc::new(RefCell::new(Inner {
            term: term.clone(),
            active: None,
            prev_rows: 0,
            cursor_row: 0,
            cursor_col: 0,
            partial: String::new(),
            pending: String::new(),
            live_depth: 0,
            closed: false,
        })))
    }

    pub fn terminal(&self) -> SharedTerminal {
        self.0.borrow().term.clone()
    }

    /// Store the active-zone renderer and draw it.
    ///
    /// While a live region owns the zone only the stored function is
    /// replaced; the region's end redraws with it.
    pub fn set_active(&self, renderer: ActiveRenderer) -> io::Result<()> {
        let mut inner = self.0.borrow_mut();
        if inner.closed {
            return Ok(());
        }
        inner.active = Some(renderer);
        if inner.live_depth == 0 {
            inner.redraw()?;
        }
        Ok(())
    }

    /// Re-invoke the stored renderer and redraw in place.
    pub fn refresh(&self) -> io::Result<()> {
        let mut inner = self.0.borrow_mut();
        if inner.closed || inner.live_depth > 0 {
            return Ok(());
        }
        inner.redraw()
    }

    /// Write one permanent line to the output zone.
    pub fn print(&self, text: &str) -> io::Result<()> {
        let mut inner = self.0.borrow_mut();
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        inner.emit(&line)
    }

    /// Append raw data; complete lines flush to the output zone, an
    /// incomplete trailing segment is held for the next call.
    pub fn write(&self, data: &str) -> io::Result<()> {
        let mut inner = self.0.borrow_mut();
        if inner.closed {
            return Ok(());
        }
        inner.partial.push_str(data);
        if let Some(idx) = inner.partial.rfind('\n') {
            let rest = inner.partial.split_off(idx + 1);
            let complete = std::mem::replace(&mut inner.partial, rest);
            inner.emit(&complete)?;
        }
        Ok(())
    }

    /// Erase the active zone for good, flush anything still buffered,
    /// optionally write a closing message. Every later call on this
    /// layout is a no-op.
    pub fn close(&self, message: Option<&str>) -> io::Result<()> {
        let mut inner = self.0.borrow_mut();
        if inner.closed {
            return Ok(());
        }
        let mut out = OutputBuffer::new();
        if inner.interactive() {
            inner.erase_into(&mut out)?;
        }
        let pending = std::mem::take(&mut inner.pending);
        out.write_str(&pending);
        let partial = std::mem::take(&mut inner.partial);
        if !partial.is_empty() {
            out.write_str(&partial);
            out.write_str("\n");
        }
        if let Some(message) = message {
            out.write_str(message);
            out.write_str("\n");
        }
        inner.flush(&mut out)?;
        inner.closed = true;
        inner.active = None;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.0.borrow().closed
    }

    /// Single-line live region rendering this layout's active zone as
    /// its footer.
    pub fn spinner(&self, text: &str) -> io::Result<Spinner> {
        let (term, footer) = self.begin_live()?;
        Spinner::start(
            &term,
            text,
            SpinnerOptions {
                footer: Some(footer),
                ..Default::default()
            },
        )
    }

    /// Multi-line live region rendering this layout's active zone as
    /// its footer.
    pub fn section(&self, title: &str) -> io::Result<Section> {
        let (term, footer) = self.begin_live()?;
        Section::start(
            &term,
            title,
            SectionOptions {
                footer: Some(footer),
                ..Default::default()
            },
        )
    }

    /// Hand the zone over to a live region: erase what this layout
    /// drew, bump the depth, build the footer callbacks.
    fn begin_live(&self) -> io::Result<(SharedTerminal, Footer)> {
        let mut inner = self.0.borrow_mut();
        if inner.interactive() && !inner.closed {
            let mut out = OutputBuffer::new();
            inner.erase_into(&mut out)?;
            inner.flush(&mut out)?;
        }
        inner.live_depth += 1;
        let term = inner.term.clone();
        drop(inner);

        let render_handle = self.clone();
        let end_handle = self.clone();
        let footer = Footer {
            render: Box::new(move || render_handle.0.borrow_mut().active_lines()),
            on_end: Box::new(move || end_handle.end_live()),
        };
        Ok((term, footer))
    }

    /// Live region ended: flush queued output, take the zone back.
    fn end_live(&self) -> io::Result<()> {
        let mut inner = self.0.borrow_mut();
        inner.live_depth = inner.live_depth.saturating_sub(1);
        if inner.live_depth > 0 {
            return Ok(());
        }
        let mut out = OutputBuffer::new();
        let pending = std::mem::take(&mut inner.pending);
        out.write_str(&pending);
        if inner.closed || !inner.interactive() || inner.active.is_none() {
            return inner.flush(&mut out);
        }
        let lines = inner.active_lines();
        inner.draw_block(&mut out, &lines, None)?;
        inner.flush(&mut out)
    }
}

// =============================================================================
// Editor composition
// =============================================================================

/// Render strategy drawing the prompt as the top of the active zone.
///
/// The prompt line (and any completion hint) is followed by the
/// layout's pinned lines; the cursor is parked inside the prompt line
/// by the same row/column arithmetic the single-region strategy uses,
/// applied across the whole block.
pub struct LayoutStrategy {
    layout: Layout,
}

impl LayoutStrategy {
    pub fn new(layout: &Layout) -> Self {
        Self {
            layout: layout.clone(),
        }
    }

    fn compose(&self, req: &RenderRequest, inner: &mut Inner) -> Vec<String> {
        let mut lines = vec![format!("{}{}", req.prompt, req.visible)];
        if let Some(hint) = &req.hint {
            lines.push(hint.clone());
        }
        lines.extend(inner.active_lines());
        lines
    }
}

impl RenderStrategy for LayoutStrategy {
    fn render(&mut self, _term: &SharedTerminal, req: &RenderRequest) -> io::Result<()> {
        let mut inner = self.layout.0.borrow_mut();
        if inner.closed || !inner.interactive() {
            return Ok(());
        }
        let cols = inner.term.borrow().columns();
        let lines = self.compose(req, &mut inner);
        let target = target_position(req.prompt_width, req.before_width, cols);
        let mut out = OutputBuffer::new();
        inner.erase_into(&mut out)?;
        inner.draw_block(&mut out, &lines, Some(target))?;
        inner.flush(&mut out)
    }

    fn finish(&mut self, _term: &SharedTerminal, req: &RenderRequest) -> io::Result<()> {
        let mut inner = self.layout.0.borrow_mut();
        let mut out = OutputBuffer::new();
        if inner.interactive() && !inner.closed {
            inner.erase_into(&mut out)?;
        }
        out.write_str(&req.prompt);
        out.write_str(&req.visible);
        out.write_str(inner.line_end());
        if inner.closed || !inner.interactive() {
            return inner.flush(&mut out);
        }
        let lines = inner.active_lines();
        inner.draw_block(&mut out, &lines, None)?;
        inner.flush(&mut out)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::terminal::{test_pipe, test_terminal};
    use crate::text::strip_ansi;

    fn two_lines() -> ActiveRenderer {
        Box::new(|| vec!["line1".to_string(), "line2".to_string()])
    }

    #[test]
    fn set_active_draws_immediately() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout.set_active(two_lines()).unwrap();
        assert_eq!(sink.contents(), "line1\nline2\n");
    }

    #[test]
    fn close_erases_zone_then_writes_message() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout.set_active(two_lines()).unwrap();
        sink.clear();
        layout.close(Some("bye")).unwrap();
        // Two rows drawn, cursor below them at column 0: climb two,
        // clear to end, message.
        assert_eq!(sink.contents(), "\x1b[2A\x1b[Jbye\n");
    }

    #[test]
    fn print_cycles_erase_text_redraw() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout.set_active(two_lines()).unwrap();
        sink.clear();
        layout.print("hello").unwrap();
        assert_eq!(sink.contents(), "\x1b[2A\x1b[Jhello\nline1\nline2\n");
    }

    #[test]
    fn refresh_picks_up_renderer_state() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        let n = Rc::new(Cell::new(0u32));
        let probe = n.clone();
        layout
            .set_active(Box::new(move || {
                probe.set(probe.get() + 1);
                vec![format!("draw {}", probe.get())]
            }))
            .unwrap();
        assert_eq!(sink.contents(), "draw 1\n");
        sink.clear();
        layout.refresh().unwrap();
        assert_eq!(sink.contents(), "\x1b[1A\x1b[Jdraw 2\n");
    }

    #[test]
    fn wrapped_active_line_widens_erase() {
        let (term, sink) = test_terminal(10);
        let layout = Layout::new(&term);
        // 25 cells at 10 columns: 3 rows for one logical line.
        layout
            .set_active(Box::new(|| vec!["x".repeat(25)]))
            .unwrap();
        sink.clear();
        layout.close(None).unwrap();
        assert_eq!(sink.contents(), "\x1b[3A\x1b[J");
    }

    #[test]
    fn write_holds_partial_lines() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout.write("ab").unwrap();
        assert_eq!(sink.contents(), "");
        layout.write("c\nde").unwrap();
        assert_eq!(sink.contents(), "abc\n");
        layout.write("\n").unwrap();
        assert_eq!(sink.contents(), "abc\nde\n");
    }

    #[test]
    fn close_flushes_leftover_partial() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout.write("tail").unwrap();
        layout.close(None).unwrap();
        assert_eq!(sink.contents(), "tail\n");
    }

    #[test]
    fn closed_layout_ignores_everything() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout.close(None).unwrap();
        sink.clear();
        layout.print("x").unwrap();
        layout.write("y\n").unwrap();
        layout.set_active(two_lines()).unwrap();
        layout.refresh().unwrap();
        layout.close(Some("again")).unwrap();
        assert_eq!(sink.contents(), "");
        assert!(layout.is_closed());
    }

    #[test]
    fn non_interactive_passes_text_through() {
        let (term, sink) = test_pipe(80);
        let layout = Layout::new(&term);
        layout.set_active(two_lines()).unwrap();
        layout.refresh().unwrap();
        layout.print("plain").unwrap();
        assert_eq!(sink.contents(), "plain\n");
    }

    #[test]
    fn spinner_renders_zone_as_footer() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout.set_active(two_lines()).unwrap();
        sink.clear();
        let mut spinner = layout.spinner("work").unwrap();
        let plain = strip_ansi(&sink.contents()).into_owned();
        assert!(plain.contains("⠋ work\nline1\nline2"), "got: {plain:?}");

        spinner.done(Some("ok")).unwrap();
        let plain = strip_ansi(&sink.contents()).into_owned();
        assert!(plain.ends_with("✔ ok\nline1\nline2\n"), "got: {plain:?}");
    }

    #[test]
    fn set_active_during_live_only_stores() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        let mut spinner = layout.spinner("busy").unwrap();
        sink.clear();
        layout
            .set_active(Box::new(|| vec!["status".to_string()]))
            .unwrap();
        assert_eq!(sink.contents(), "", "no draw while a region animates");

        spinner.done(None).unwrap();
        let plain = strip_ansi(&sink.contents()).into_owned();
        assert!(plain.ends_with("✔ busy\nstatus\n"), "got: {plain:?}");
    }

    #[test]
    fn print_during_live_is_queued_until_freeze() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        let mut spinner = layout.spinner("busy").unwrap();
        layout.print("mid").unwrap();
        assert!(!sink.contents().contains("mid"));
        spinner.done(None).unwrap();
        let plain = strip_ansi(&sink.contents()).into_owned();
        assert!(plain.contains("✔ busy\nmid\n"), "got: {plain:?}");
    }

    #[test]
    fn nested_regions_release_zone_once() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout
            .set_active(Box::new(|| vec!["zone".to_string()]))
            .unwrap();
        let mut outer = layout.spinner("outer").unwrap();
        let mut inner = layout.spinner("inner").unwrap();
        inner.done(None).unwrap();
        sink.clear();
        layout.refresh().unwrap();
        assert_eq!(sink.contents(), "", "outer region still owns the zone");
        outer.done(None).unwrap();
        assert!(strip_ansi(&sink.contents()).ends_with("✔ outer\nzone\n"));
    }

    #[test]
    fn strategy_parks_cursor_inside_prompt_line() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        layout
            .set_active(Box::new(|| vec!["status".to_string()]))
            .unwrap();
        sink.clear();

        let req = RenderRequest {
            prompt: "> ".to_string(),
            prompt_width: 2,
            visible: "abc".to_string(),
            before_width: 1,
            hint: None,
        };
        let mut strategy = LayoutStrategy::new(&layout);
        strategy.render(&term, &req).unwrap();
        // Block of two rows, then up to the prompt row, column 3.
        assert_eq!(
            sink.contents(),
            "\x1b[1A\x1b[J> abc\nstatus\n\x1b[2A\r\x1b[3C"
        );

        sink.clear();
        strategy.finish(&term, &req).unwrap();
        // Cursor was parked mid-line: erase needs the carriage return.
        assert_eq!(sink.contents(), "\r\x1b[J> abc\nstatus\n");
    }

    #[test]
    fn strategy_exact_width_prompt_parks_on_last_cell() {
        let (term, sink) = test_terminal(10);
        let layout = Layout::new(&term);
        layout
            .set_active(Box::new(|| vec!["status".to_string()]))
            .unwrap();
        sink.clear();

        // "> " + 8 chars fills the 10-column row exactly: the cursor
        // parks on the last cell of the prompt row, not on the row
        // below (which holds the pinned line).
        let req = RenderRequest {
            prompt: "> ".to_string(),
            prompt_width: 2,
            visible: "x".repeat(8),
            before_width: 8,
            hint: None,
        };
        let mut strategy = LayoutStrategy::new(&layout);
        strategy.render(&term, &req).unwrap();
        assert_eq!(
            sink.contents(),
            format!("\x1b[1A\x1b[J> {}\nstatus\n\x1b[2A\r\x1b[9C", "x".repeat(8))
        );

        sink.clear();
        let req2 = RenderRequest {
            visible: "x".repeat(7),
            before_width: 7,
            ..req
        };
        strategy.render(&term, &req2).unwrap();
        assert!(
            sink.contents().starts_with("\r\x1b[J"),
            "erase must stay within the drawn block, got: {:?}",
            sink.contents()
        );
    }

    #[test]
    fn strategy_redraw_tracks_edits() {
        let (term, sink) = test_terminal(80);
        let layout = Layout::new(&term);
        let mut strategy = LayoutStrategy::new(&layout);
        let req = RenderRequest {
            prompt: "> ".to_string(),
            prompt_width: 2,
            visible: "a".to_string(),
            before_width: 1,
            hint: None,
        };
        strategy.render(&term, &req).unwrap();
        sink.clear();

        let req2 = RenderRequest {
            visible: "ab".to_string(),
            before_width: 2,
            ..req
        };
        strategy.render(&term, &req2).unwrap();
        // Cursor sat at row 0 col 3; erase is CR + clear, then redraw.
        assert_eq!(sink.contents(), "\r\x1b[J> ab\n\x1b[1A\r\x1b[4C");
    }
}
