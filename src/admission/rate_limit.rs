//! Fixed-window rate limiting state.
//!
//! # Design Decisions
//! - Fixed window, not token bucket: counters reset abruptly at window
//!   boundaries, so a client can burst `max` requests at the end of one
//!   window and again right after the reset
//! - A request that lands over the limit still increments the counter
//! - The caller supplies `now`, which keeps the store testable without
//!   sleeping

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::admission::descriptor::ClientKey;

/// One counting window for a single client.
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    window_start: Instant,
    count: u32,
}

/// Outcome of counting one request against a client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowVerdict {
    Allowed { count: u32 },
    Exceeded { count: u32 },
}

/// Interior-synchronized store of per-client rate windows.
///
/// The DashMap entry API holds the shard lock across the whole
/// check-then-increment, so two concurrent requests from the same client
/// can never both read a stale count and both pass the threshold.
pub struct WindowStore {
    windows: DashMap<ClientKey, RateWindow>,
    window: Duration,
    max_requests: u32,
}

impl WindowStore {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            max_requests,
        }
    }

    /// Count one request for `key` at `now`.
    ///
    /// Resets the window when its lifetime has elapsed, then increments
    /// unconditionally. The increment stands even for an `Exceeded`
    /// verdict: the rejected request occupies budget in this window.
    pub fn count(&self, key: &ClientKey, now: Instant) -> WindowVerdict {
        let mut entry = self.windows.entry(key.clone()).or_insert(RateWindow {
            window_start: now,
            count: 0,
        });

        if now.duration_since(entry.window_start) >= self.window {
            entry.window_start = now;
            entry.count = 0;
        }

        entry.count += 1;

        if entry.count > self.max_requests {
            WindowVerdict::Exceeded { count: entry.count }
        } else {
            WindowVerdict::Allowed { count: entry.count }
        }
    }

    /// Current count for a key, without mutating the window.
    pub fn current(&self, key: &ClientKey) -> Option<u32> {
        self.windows.get(key).map(|w| w.count)
    }

    /// Number of tracked windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Drop windows that have been idle for more than `stale_after`
    /// window durations. Bounds store growth under many distinct keys.
    pub fn sweep(&self, now: Instant, stale_after: u32) {
        let horizon = self.window * stale_after.max(1);
        self.windows
            .retain(|_, w| now.duration_since(w.window_start) <= horizon);
    }
}
