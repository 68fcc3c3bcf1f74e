//! Per-key fixed-window counter.

use serde::Serialize;

/// The state tracked for one full key.
///
/// An entry is **active** while `now < reset_time` and **expired** once
/// `now >= reset_time`. Expired entries are logically absent; they are only
/// physically removed by cleanup or `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitEntry {
    /// Requests counted in the current window
    pub count: u32,
    /// When the current window ends (ms since the Unix epoch)
    pub reset_time: u64,
}

impl RateLimitEntry {
    /// Open a new window at `now_ms` holding the request that opened it.
    pub fn open(now_ms: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            reset_time: now_ms.saturating_add(window_ms),
        }
    }

    /// Whether the window has ended.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.reset_time
    }

    /// Quota left under `max_requests`.
    pub fn remaining(&self, max_requests: u32) -> u32 {
        max_requests.saturating_sub(self.count)
    }

    /// Milliseconds until the window ends, zero once expired.
    pub fn duration_until_reset(&self, now_ms: u64) -> u64 {
        self.reset_time.saturating_sub(now_ms)
    }
}
