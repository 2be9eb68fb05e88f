//! Bounded, most-recent-first input history.
//!
//! Shared between sessions via `Rc<RefCell<..>>` so every prompt in a
//! process walks the same entries. Blank submissions and consecutive
//! duplicates are never recorded.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub type SharedHistory = Rc<RefCell<History>>;

/// Ring of previously submitted lines, index 0 = most recent.
#[derive(Debug, Default)]
pub struct History {
    entries: VecDeque<String>,
    max: usize,
}

impl History {
    pub fn new(max: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max,
        }
    }

    /// Shared history with the given capacity.
    pub fn shared(max: usize) -> SharedHistory {
        Rc::new(RefCell::new(Self::new(max)))
    }

    /// Record a submission. Blank lines and a repeat of the most
    /// recent entry are dropped.
    pub fn push(&mut self, entry: &str) {
        if entry.trim().is_empty() {
            return;
        }
        if self.entries.front().is_some_and(|last| last == entry) {
            return;
        }
        self.entries.push_front(entry.to_string());
        while self.max > 0 && self.entries.len() > self.max {
            self.entries.pop_back();
        }
    }

    /// Entry at `index` steps back from the most recent.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
