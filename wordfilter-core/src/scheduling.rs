// wordfilter-core/src/scheduling.rs
//! Timing policies that sit in front of the engines.
//!
//! Paste handling waits a short, fixed delay so the host's own paste insertion
//! has landed before the buffer is read. Rich-text mutation bursts are
//! coalesced by a trailing-edge debouncer into one engine call. Both use
//! `tokio::time`, so tests can drive them with paused time.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Delay between a paste event and the engine call.
pub const PASTE_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Default coalescing window for rich-text mutation bursts.
pub const DEFAULT_MUTATION_DEBOUNCE: Duration = Duration::from_millis(100);

/// Tunables for `TextFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOptions {
    pub paste_delay: Duration,
    pub mutation_debounce: Duration,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            paste_delay: PASTE_SETTLE_DELAY,
            mutation_debounce: DEFAULT_MUTATION_DEBOUNCE,
        }
    }
}

/// Trailing-edge debouncer. Each recorded mutation pushes the deadline out to
/// `window` after it; the burst is released once the deadline passes with no
/// further mutations.
#[derive(Debug, Clone)]
pub struct MutationDebouncer {
    window: Duration,
    deadline: Option<Instant>,
    coalesced: usize,
}

impl MutationDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
            coalesced: 0,
        }
    }

    pub fn record(&mut self) {
        self.deadline = Some(Instant::now() + self.window);
        self.coalesced += 1;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Mutations recorded since the last release.
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    /// Releases the burst if its deadline has passed. Returns the number of
    /// coalesced mutations, or `None` if nothing is due.
    pub fn take_ready(&mut self) -> Option<usize> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                Some(std::mem::take(&mut self.coalesced))
            }
            _ => None,
        }
    }

    /// Waits until the pending burst is due and releases it. Returns `None`
    /// immediately if nothing is pending.
    pub async fn settle(&mut self) -> Option<usize> {
        let deadline = self.deadline?;
        sleep_until(deadline).await;
        self.take_ready()
    }
}
