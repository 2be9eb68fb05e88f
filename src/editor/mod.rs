//! Line editing session with cursor-accurate in-place redraw.
//!
//! A [`Session`] owns the editable buffer, cursor, history walk, and
//! completion state. It never writes to the terminal itself: each
//! keystroke produces a [`RenderRequest`] that goes to an injected
//! [`RenderStrategy`]. The default [`InlineStrategy`] draws a plain
//! single-region prompt; the layout manager substitutes its own
//! strategy to compose the prompt with surrounding pinned content.
//!
//! A session resolves exactly once, with [`Resolution::Submit`],
//! [`Resolution::Cancel`], or [`Resolution::Eof`].

mod completion;
mod history;

pub use history::{History, SharedHistory};

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::input::{Chunk, KeyEvent, Modifier, RawReader, decode};
use crate::render::cursor::{target_position, visual_rows};
use crate::render::{OutputBuffer, ansi};
use crate::terminal::SharedTerminal;
use crate::text::{char_width, string_width};

// =============================================================================
// Options and resolution
// =============================================================================

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Line accepted (and recorded in history when one is attached).
    Submit(String),
    /// Interrupted.
    Cancel,
    /// End of input.
    Eof,
}

/// Prompt text, fixed or recomputed on every render.
pub enum Prompt {
    Text(String),
    Dynamic(Box<dyn Fn() -> String>),
}

impl Prompt {
    fn text(&self) -> String {
        match self {
            Prompt::Text(s) => s.clone(),
            Prompt::Dynamic(f) => f(),
        }
    }
}

impl From<&str> for Prompt {
    fn from(s: &str) -> Self {
        Prompt::Text(s.to_string())
    }
}

/// Candidate lookup for completion: partial word in, matches out.
pub type CompletionLookup = Box<dyn Fn(&str) -> Vec<String>>;

pub struct SessionOptions {
    pub prompt: Prompt,
    pub initial: String,
    pub history: Option<SharedHistory>,
    pub complete: Option<CompletionLookup>,
    /// Render every buffer character as this character instead.
    pub mask: Option<char>,
    /// On interrupt with a non-empty buffer: clear and keep reading
    /// instead of resolving.
    pub clear_on_interrupt: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            prompt: Prompt::Text("> ".to_string()),
            initial: String::new(),
            history: None,
            complete: None,
            mask: None,
            clear_on_interrupt: false,
        }
    }
}

// =============================================================================
// Render contract
// =============================================================================

/// Snapshot handed to the render strategy after every keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub prompt: String,
    pub prompt_width: usize,
    /// Buffer text with any mask already applied.
    pub visible: String,
    /// Rendered width of the visible text left of the cursor.
    pub before_width: usize,
    /// Ephemeral line shown under the prompt, overwritten next render.
    pub hint: Option<String>,
}

/// Low-level drawing seam.
///
/// `render` redraws the prompt in place; `finish` freezes the final
/// line into scrollback when the session resolves.
pub trait RenderStrategy {
    fn render(&mut self, term: &SharedTerminal, req: &RenderRequest) -> io::Result<()>;
    fn finish(&mut self, term: &SharedTerminal, req: &RenderRequest) -> io::Result<()>;
}

/// Default single-region strategy: erase the previously drawn block,
/// rewrite prompt + text (+ hint), park the cursor via row/column
/// arithmetic.
pub struct InlineStrategy {
    prev_cursor_row: usize,
    drawn: bool,
}

impl InlineStrategy {
    pub fn new() -> Self {
        Self {
            prev_cursor_row: 0,
            drawn: false,
        }
    }

    fn erase(&self, out: &mut OutputBuffer) -> io::Result<()> {
        if self.drawn {
            ansi::cursor_up(out, self.prev_cursor_row)?;
            ansi::cursor_column_zero(out)?;
            ansi::erase_down(out)?;
        }
        Ok(())
    }
}

impl Default for InlineStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStrategy for InlineStrategy {
    fn render(&mut self, term: &SharedTerminal, req: &RenderRequest) -> io::Result<()> {
        let cols = term.borrow().columns();
        let mut out = OutputBuffer::new();
        self.erase(&mut out)?;

        out.write_str(&req.prompt);
        out.write_str(&req.visible);

        let visible_width = string_width(&req.visible);
        let total = req.prompt_width + visible_width;
        let main_rows = visual_rows(total, cols);
        // Where the terminal actually left the cursor, deferred wrap
        // included: text ending exactly at the margin keeps it on the
        // last cell, one row above the naive division.
        let (mut cur_row, mut cur_col) = target_position(req.prompt_width, visible_width, cols);

        if let Some(hint) = &req.hint {
            // Raw mode: newline alone does not return the carriage.
            out.write_str("\r\n");
            out.write_str(hint);
            let (hint_row, hint_col) = target_position(0, string_width(hint), cols);
            cur_row = main_rows + hint_row;
            cur_col = hint_col;
        }

        let (row, col) = target_position(req.prompt_width, req.before_width, cols);
        out.write_str(&crate::render::cursor::move_to(cur_row, cur_col, row, col));

        let mut t = term.borrow_mut();
        out.flush_to(&mut *t)?;
        // Recorded only after the flush succeeded: the next erase is
        // computed from this.
        self.prev_cursor_row = row;
        self.drawn = true;
        Ok(())
    }

    fn finish(&mut self, term: &SharedTerminal, req: &RenderRequest) -> io::Result<()> {
        let mut out = OutputBuffer::new();
        self.erase(&mut out)?;
        out.write_str(&req.prompt);
        out.write_str(&req.visible);
        out.write_str("\r\n");
        let mut t = term.borrow_mut();
        out.flush_to(&mut *t)?;
        self.prev_cursor_row = 0;
        self.drawn = false;
        Ok(())
    }
}

// =============================================================================
// Session
// =============================================================================

/// One line-editing session. Invariant: `cursor <= chars.len()`.
pub struct Session {
    chars: Vec<char>,
    cursor: usize,
    options: SessionOptions,
    hint: Option<String>,
    hist_index: Option<usize>,
    saved_draft: Option<String>,
}

impl Session {
    pub fn new(options: SessionOptions) -> Self {
        let chars: Vec<char> = options.initial.chars().collect();
        let cursor = chars.len();
        Self {
            chars,
            cursor,
            options,
            hint: None,
            hist_index: None,
            saved_draft: None,
        }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Snapshot for the render strategy.
    pub fn render_request(&self) -> RenderRequest {
        let prompt = self.options.prompt.text();
        let prompt_width = string_width(&prompt);
        let (visible, before_width) = match self.options.mask {
            Some(mask) => {
                let w = char_width(mask);
                (mask.to_string().repeat(self.chars.len()), w * self.cursor)
            }
            None => {
                let before: String = self.chars[..self.cursor].iter().collect();
                (self.text(), string_width(&before))
            }
        };
        RenderRequest {
            prompt,
            prompt_width,
            visible,
            before_width,
            hint: self.hint.clone(),
        }
    }

    /// Apply one key. `Some` means the session resolved.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Option<Resolution> {
        // The hint is ephemeral: any keystroke retires it (completion
        // re-sets it below).
        self.hint = None;

        if key.modifiers == Modifier::CTRL {
            return self.handle_ctrl(key);
        }
        if key.modifiers.contains(Modifier::META) {
            self.handle_meta(key);
            return None;
        }

        match key.name.as_str() {
            "backspace" => self.backspace(),
            "delete" => self.delete_forward(),
            "left" => self.move_left(),
            "right" => self.move_right(),
            "home" => self.move_home(),
            "end" => self.move_end(),
            "up" => self.history_up(),
            "down" => self.history_down(),
            "escape" | "insert" | "pageup" | "pagedown" => {}
            "tab" if key.modifiers.contains(Modifier::SHIFT) => {}
            _ => {
                if !key.literal.is_empty() {
                    self.insert_literal(&key.literal.clone());
                }
            }
        }
        None
    }

    fn handle_ctrl(&mut self, key: &KeyEvent) -> Option<Resolution> {
        match key.name.as_str() {
            // 0x0D and 0x0A decode as chords; this is where they mean
            // "enter".
            "m" | "j" => return Some(self.submit()),
            "c" => return self.interrupt(),
            "d" => return self.end_of_input(),
            "h" => self.backspace(),
            "i" => self.complete(),
            "a" => self.move_home(),
            "e" => self.move_end(),
            "b" => self.move_left(),
            "f" => self.move_right(),
            "u" => self.kill_to_start(),
            "k" => self.kill_to_end(),
            "w" => self.delete_word_left(),
            "p" => self.history_up(),
            "n" => self.history_down(),
            _ => {}
        }
        None
    }

    fn handle_meta(&mut self, key: &KeyEvent) {
        match key.name.as_str() {
            "b" => self.move_word_left(),
            "f" => self.move_word_right(),
            "d" => self.delete_word_right(),
            "backspace" => self.delete_word_left(),
            _ => {}
        }
    }

    fn submit(&mut self) -> Resolution {
        let text = self.text();
        if let Some(history) = &self.options.history {
            history.borrow_mut().push(&text);
        }
        Resolution::Submit(text)
    }

    fn interrupt(&mut self) -> Option<Resolution> {
        if self.chars.is_empty() {
            return Some(Resolution::Cancel);
        }
        if self.options.clear_on_interrupt {
            self.chars.clear();
            self.cursor = 0;
            self.hist_index = None;
            return None;
        }
        Some(Resolution::Cancel)
    }

    fn end_of_input(&mut self) -> Option<Resolution> {
        if self.chars.is_empty() {
            Some(Resolution::Eof)
        } else {
            self.delete_forward();
            None
        }
    }

    // -- edits ---------------------------------------------------------------

    pub fn insert_literal(&mut self, literal: &str) {
        for c in literal.chars() {
            if c.is_control() {
                continue;
            }
            self.chars.insert(self.cursor, c);
            self.cursor += 1;
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn kill_to_start(&mut self) {
        self.chars.drain(..self.cursor);
        self.cursor = 0;
    }

    pub fn kill_to_end(&mut self) {
        self.chars.truncate(self.cursor);
    }

    pub fn delete_word_left(&mut self) {
        let target = self.prev_word_boundary();
        self.chars.drain(target..self.cursor);
        self.cursor = target;
    }

    pub fn delete_word_right(&mut self) {
        let target = self.next_word_boundary();
        self.chars.drain(self.cursor..target);
    }

    // -- movement ------------------------------------------------------------

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn move_word_left(&mut self) {
        self.cursor = self.prev_word_boundary();
    }

    pub fn move_word_right(&mut self) {
        self.cursor = self.next_word_boundary();
    }

    fn prev_word_boundary(&self) -> usize {
        let mut i = self.cursor;
        while i > 0 && self.chars[i - 1].is_whitespace() {
            i -= 1;
        }
        while i > 0 && !self.chars[i - 1].is_whitespace() {
            i -= 1;
        }
        i
    }

    fn next_word_boundary(&self) -> usize {
        let mut i = self.cursor;
        while i < self.chars.len() && self.chars[i].is_whitespace() {
            i += 1;
        }
        while i < self.chars.len() && !self.chars[i].is_whitespace() {
            i += 1;
        }
        i
    }

    // -- history -------------------------------------------------------------

    pub fn history_up(&mut self) {
        let Some(history) = &self.options.history else {
            return;
        };
        let history = history.borrow();
        if history.is_empty() {
            return;
        }
        let next = match self.hist_index {
            None => {
                self.saved_draft = Some(self.text());
                0
            }
            Some(i) if i + 1 < history.len() => i + 1,
            Some(i) => i,
        };
        if let Some(entry) = history.get(next) {
            self.chars = entry.chars().collect();
            self.cursor = self.chars.len();
            self.hist_index = Some(next);
        }
    }

    pub fn history_down(&mut self) {
        match self.hist_index {
            Some(0) => {
                let draft = self.saved_draft.take().unwrap_or_default();
                self.chars = draft.chars().collect();
                self.cursor = self.chars.len();
                self.hist_index = None;
            }
            Some(i) => {
                let Some(history) = &self.options.history else {
                    return;
                };
                let history = history.borrow();
                if let Some(entry) = history.get(i - 1) {
                    self.chars = entry.chars().collect();
                    self.cursor = self.chars.len();
                    self.hist_index = Some(i - 1);
                }
            }
            None => {}
        }
    }

    // -- completion ----------------------------------------------------------

    pub fn complete(&mut self) {
        let Some(lookup) = &self.options.complete else {
            return;
        };
        let start = completion::word_start(&self.chars, self.cursor);
        let word: String = self.chars[start..self.cursor].iter().collect();
        let candidates = lookup(&word);
        match candidates.len() {
            0 => {}
            1 => self.replace_word(start, &candidates[0]),
            _ => {
                let prefix = completion::longest_common_prefix(&candidates);
                if prefix.chars().count() > word.chars().count() {
                    self.replace_word(start, &prefix);
                }
                self.hint = Some(completion::hint_line(&candidates));
            }
        }
    }

    fn replace_word(&mut self, start: usize, replacement: &str) {
        let replacement: Vec<char> = replacement.chars().collect();
        self.chars.splice(start..self.cursor, replacement.iter().copied());
        self.cursor = start + replacement.len();
    }
}

// =============================================================================
// Blocking driver
// =============================================================================

/// Called when the input wait times out; returns the next animation
/// deadline to wait for (None blocks until input).
pub type IdleHook<'a> = &'a mut dyn FnMut() -> io::Result<Option<Duration>>;

/// Only one raw-mode stdin reader may exist at a time; a second
/// concurrent session would race on the same stream.
static READER_ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
struct ReaderSlot;

impl ReaderSlot {
    fn claim() -> io::Result<Self> {
        if READER_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(io::Error::other("an input session is already reading stdin"));
        }
        Ok(Self)
    }
}

impl Drop for ReaderSlot {
    fn drop(&mut self) {
        READER_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// Read one line with the default single-region renderer.
pub fn read_line(term: &SharedTerminal, options: SessionOptions) -> io::Result<Resolution> {
    let mut strategy = InlineStrategy::new();
    read_line_with(term, options, &mut strategy, None)
}

/// Read one line with an injected render strategy and optional idle
/// hook.
///
/// On a non-interactive terminal this degrades to a plain buffered
/// line read: no raw mode, no redraws.
pub fn read_line_with(
    term: &SharedTerminal,
    options: SessionOptions,
    strategy: &mut dyn RenderStrategy,
    mut idle: Option<IdleHook<'_>>,
) -> io::Result<Resolution> {
    if !term.borrow().is_interactive() {
        return read_plain(options);
    }

    let _slot = ReaderSlot::claim()?;
    term.borrow_mut().enable_raw()?;
    let result = drive(term, options, strategy, &mut idle);
    // Raw mode must not outlive the session, error or not.
    let restore = term.borrow_mut().disable_raw();
    let resolution = result?;
    restore?;
    Ok(resolution)
}

fn drive(
    term: &SharedTerminal,
    options: SessionOptions,
    strategy: &mut dyn RenderStrategy,
    idle: &mut Option<IdleHook<'_>>,
) -> io::Result<Resolution> {
    let mut session = Session::new(options);
    let mut reader = RawReader::new();
    strategy.render(term, &session.render_request())?;

    loop {
        let timeout = match idle.as_mut() {
            Some(hook) => hook()?,
            None => None,
        };
        match reader.read_chunk(timeout)? {
            Chunk::TimedOut => continue,
            Chunk::Eof => {
                strategy.finish(term, &session.render_request())?;
                return Ok(Resolution::Eof);
            }
            Chunk::Data(data) => {
                let key = decode(&data);
                if let Some(resolution) = session.handle_key(&key) {
                    strategy.finish(term, &session.render_request())?;
                    return Ok(resolution);
                }
                strategy.render(term, &session.render_request())?;
            }
        }
    }
}

/// Piped stdin: one buffered line, no editing.
fn read_plain(options: SessionOptions) -> io::Result<Resolution> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(Resolution::Eof);
    }
    let line = line.trim_end_matches(['\n', '\r']).to_string();
    if let Some(history) = &options.history {
        history.borrow_mut().push(&line);
    }
    Ok(Resolution::Submit(line))
}

// =============================================================================
// Tests
// =============================================================================
