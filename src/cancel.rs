//! Two-stage interrupt token.
//!
//! Long-running command handlers receive a [`CancelToken`]. The first
//! interrupt flips it to `CancelRequested` — the handler should wind
//! down while the engine keeps accepting input. A second interrupt
//! while the same handler runs escalates to `ForceExit`; the embedder
//! decides what termination looks like (this crate never calls
//! `process::exit`).

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Interrupt escalation states. Transitions are one-way until
/// [`CancelToken::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelState {
    Running,
    CancelRequested,
    ForceExit,
}

const RUNNING: u8 = 0;
const REQUESTED: u8 = 1;
const FORCE: u8 = 2;

/// Shared handle to the interrupt state machine.
///
/// Clones observe the same state. Atomic so a signal handler can
/// escalate while a handler on the main thread polls.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<AtomicU8>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CancelState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => CancelState::Running,
            REQUESTED => CancelState::CancelRequested,
            _ => CancelState::ForceExit,
        }
    }

    /// Record one interrupt and return the resulting state.
    ///
    /// `Running → CancelRequested → ForceExit`; further signals stay
    /// at `ForceExit`.
    pub fn signal(&self) -> CancelState {
        // Two-step CAS chain rather than fetch_add: repeated signals
        // must saturate at FORCE, never wrap.
        if self
            .state
            .compare_exchange(RUNNING, REQUESTED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            return CancelState::CancelRequested;
        }
        let _ = self
            .state
            .compare_exchange(REQUESTED, FORCE, Ordering::SeqCst, Ordering::SeqCst);
        CancelState::ForceExit
    }

    /// True once any interrupt has been recorded.
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::SeqCst) != RUNNING
    }

    /// True once a second interrupt has escalated the token.
    pub fn is_force_exit(&self) -> bool {
        self.state.load(Ordering::SeqCst) == FORCE
    }

    /// Rearm for the next handler.
    pub fn reset(&self) {
        self.state.store(RUNNING, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalates_in_order() {
        let token = CancelToken::new();
        assert_eq!(token.state(), CancelState::Running);
        assert!(!token.is_cancelled());

        assert_eq!(token.signal(), CancelState::CancelRequested);
        assert!(token.is_cancelled());
        assert!(!token.is_force_exit());

        assert_eq!(token.signal(), CancelState::ForceExit);
        assert!(token.is_force_exit());

        // Saturates.
        assert_eq!(token.signal(), CancelState::ForceExit);
    }

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let handle = token.clone();
        token.signal();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn reset_rearms() {
        let token = CancelToken::new();
        token.signal();
        token.signal();
        token.reset();
        assert_eq!(token.state(), CancelState::Running);
        assert_eq!(token.signal(), CancelState::CancelRequested);
    }
}
