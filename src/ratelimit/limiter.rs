//! Core fixed-window rate limiter.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::counter::RateLimitEntry;
use super::key::FullKey;
use super::store::{MemoryStore, RateLimitStore};
use crate::error::{Result, TourguardError};

/// Configuration for a single limiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Maximum requests allowed per window
    pub max_requests: u32,
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Namespace applied to every key this limiter stores
    pub key_prefix: String,
}

impl RateLimiterConfig {
    /// Create a limiter configuration.
    pub fn new(max_requests: u32, window_ms: u64, key_prefix: impl Into<String>) -> Self {
        Self {
            max_requests,
            window_ms,
            key_prefix: key_prefix.into(),
        }
    }

    /// Public portal page loads: 10 per minute.
    pub fn portal_access() -> Self {
        Self::new(10, 60_000, "portal")
    }

    /// Authentication attempts: 5 per 15 minutes.
    pub fn auth_attempts() -> Self {
        Self::new(5, 15 * 60_000, "auth")
    }

    /// Reject configurations that could never admit a request or never open a window.
    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(TourguardError::Config(format!(
                "limiter '{}': max_requests must be > 0",
                self.key_prefix
            )));
        }
        if self.window_ms == 0 {
            return Err(TourguardError::Config(format!(
                "limiter '{}': window_ms must be > 0",
                self.key_prefix
            )));
        }
        Ok(())
    }
}

/// Outcome of [`RateLimiter::is_allowed`].
///
/// `allowed == false` means the quota is exhausted until `reset_time`; it is an
/// expected result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// ms since the Unix epoch
    pub reset_time: u64,
}

/// Snapshot returned by [`RateLimiter::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    pub count: u32,
    pub remaining: u32,
    /// ms since the Unix epoch
    pub reset_time: u64,
}

/// A fixed-window rate limiter keyed by arbitrary strings.
///
/// Every operation runs to completion under a single lock of the store, so a
/// limiter can be shared behind an `Arc`. Quotas are per instance: separate
/// processes or separate limiters never coordinate.
///
/// Expired entries are reclaimed lazily. Each [`is_allowed`](Self::is_allowed)
/// call first scans the whole store and drops expired windows, which costs
/// O(distinct keys) per call. That is fine for the expected cardinality
/// (distinct client fingerprints) and needs no background timer.
pub struct RateLimiter<C: Clock = SystemClock, S: RateLimitStore = MemoryStore> {
    config: RateLimiterConfig,
    clock: C,
    store: Mutex<S>,
}

impl RateLimiter {
    /// Create a limiter on the system clock with in-memory storage.
    pub fn new(config: RateLimiterConfig) -> Result<Self> {
        Self::with_parts(config, SystemClock, MemoryStore::new())
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a limiter on a custom clock with in-memory storage.
    pub fn with_clock(config: RateLimiterConfig, clock: C) -> Result<Self> {
        Self::with_parts(config, clock, MemoryStore::new())
    }
}

impl<C: Clock, S: RateLimitStore> RateLimiter<C, S> {
    /// Create a limiter from an explicit clock and store.
    pub fn with_parts(config: RateLimiterConfig, clock: C, store: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            store: Mutex::new(store),
        })
    }

    /// Count a request for `key` and decide whether it may proceed.
    pub fn is_allowed(&self, key: &str) -> RateLimitDecision {
        let full_key = FullKey::new(&self.config.key_prefix, key);
        let now = self.clock.now_ms();
        let max = self.config.max_requests;

        trace!(key = %full_key, now, "Checking rate limit");

        let mut store = self.store.lock();
        Self::evict_expired(&mut *store, now);

        match store.get(&full_key) {
            Some(mut entry) if !entry.is_expired(now) => {
                if entry.count >= max {
                    debug!(
                        key = %full_key,
                        count = entry.count,
                        limit = max,
                        retry_after_ms = entry.duration_until_reset(now),
                        "Rate limit exceeded"
                    );
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_time: entry.reset_time,
                    };
                }

                entry.count += 1;
                store.insert(full_key, entry);
                RateLimitDecision {
                    allowed: true,
                    remaining: entry.remaining(max),
                    reset_time: entry.reset_time,
                }
            }
            _ => {
                let entry = RateLimitEntry::open(now, self.config.window_ms);
                debug!(
                    key = %full_key,
                    limit = max,
                    reset_time = entry.reset_time,
                    "Opening new rate limit window"
                );
                store.insert(full_key, entry);
                RateLimitDecision {
                    allowed: true,
                    remaining: entry.remaining(max),
                    reset_time: entry.reset_time,
                }
            }
        }
    }

    /// Report the state of `key` without counting a request.
    ///
    /// For an absent or expired key this describes the window a request made
    /// now would open; nothing is stored.
    pub fn status(&self, key: &str) -> RateLimitStatus {
        let full_key = FullKey::new(&self.config.key_prefix, key);
        let now = self.clock.now_ms();
        let max = self.config.max_requests;

        let store = self.store.lock();
        match store.get(&full_key) {
            Some(entry) if !entry.is_expired(now) => RateLimitStatus {
                count: entry.count,
                remaining: entry.remaining(max),
                reset_time: entry.reset_time,
            },
            _ => RateLimitStatus {
                count: 0,
                remaining: max,
                reset_time: now.saturating_add(self.config.window_ms),
            },
        }
    }

    /// Forget any window for `key`. Resetting an absent key is a no-op.
    pub fn reset(&self, key: &str) {
        let full_key = FullKey::new(&self.config.key_prefix, key);
        if self.store.lock().remove(&full_key).is_some() {
            debug!(key = %full_key, "Rate limit reset");
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut store = self.store.lock();
        Self::evict_expired(&mut *store, now)
    }

    /// The configuration this limiter was built with.
    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }

    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn entry_count(&self) -> usize {
        self.store.lock().len()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    fn evict_expired(store: &mut S, now: u64) -> usize {
        let before = store.len();
        store.retain(&mut |_, entry| !entry.is_expired(now));
        let evicted = before - store.len();
        if evicted > 0 {
            debug!(evicted, remaining_entries = store.len(), "Evicted expired rate limit entries");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::clock::ManualClock;
    use std::sync::Arc;

    fn test_limiter(max: u32, window_ms: u64) -> (RateLimiter<Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let limiter =
            RateLimiter::with_clock(RateLimiterConfig::new(max, window_ms, "test"), clock.clone())
                .unwrap();
        (limiter, clock)
    }

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = RateLimiter::new(RateLimiterConfig::portal_access()).unwrap();
        assert_eq!(limiter.entry_count(), 0);
        assert_eq!(limiter.config().max_requests, 10);
    }

    #[test]
    fn test_rejects_zero_max_requests() {
        let result = RateLimiter::new(RateLimiterConfig::new(0, 1000, "x"));
        assert!(matches!(result, Err(TourguardError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = RateLimiter::new(RateLimiterConfig::new(1, 0, "x"));
        assert!(matches!(result, Err(TourguardError::Config(_))));
    }

    #[test]
    fn test_first_request_opens_window() {
        let (limiter, clock) = test_limiter(3, 1000);
        clock.set(42);

        let decision = limiter.is_allowed("a");

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 2);
        assert_eq!(decision.reset_time, 1042);
        assert_eq!(limiter.entry_count(), 1);
    }

    #[test]
    fn test_denied_request_does_not_count() {
        let (limiter, _clock) = test_limiter(2, 1000);

        limiter.is_allowed("a");
        limiter.is_allowed("a");
        for _ in 0..5 {
            let decision = limiter.is_allowed("a");
            assert!(!decision.allowed);
            assert_eq!(decision.remaining, 0);
        }

        assert_eq!(limiter.status("a").count, 2);
    }

    #[test]
    fn test_window_reopens_exactly_at_reset_time() {
        let (limiter, clock) = test_limiter(1, 1000);

        assert!(limiter.is_allowed("a").allowed);
        clock.set(999);
        assert!(!limiter.is_allowed("a").allowed);

        clock.set(1000);
        let decision = limiter.is_allowed("a");
        assert!(decision.allowed);
        assert_eq!(decision.reset_time, 2000);
    }

    #[test]
    fn test_status_of_absent_key_is_hypothetical() {
        let (limiter, clock) = test_limiter(4, 500);
        clock.set(100);

        let status = limiter.status("nobody");

        assert_eq!(status.count, 0);
        assert_eq!(status.remaining, 4);
        assert_eq!(status.reset_time, 600);
        assert_eq!(limiter.entry_count(), 0);
    }

    #[test]
    fn test_status_treats_expired_entry_as_absent() {
        let (limiter, clock) = test_limiter(4, 500);
        limiter.is_allowed("a");
        limiter.is_allowed("a");

        clock.set(700);
        let status = limiter.status("a");

        assert_eq!(status.count, 0);
        assert_eq!(status.remaining, 4);
        assert_eq!(status.reset_time, 1200);
        // Still physically present until the next cleanup.
        assert_eq!(limiter.entry_count(), 1);
    }

    #[test]
    fn test_is_allowed_evicts_other_expired_keys() {
        let (limiter, clock) = test_limiter(5, 100);
        limiter.is_allowed("a");
        limiter.is_allowed("b");
        assert_eq!(limiter.entry_count(), 2);

        clock.set(150);
        limiter.is_allowed("c");

        assert_eq!(limiter.entry_count(), 1);
    }

    #[test]
    fn test_cleanup_expired_counts_evictions() {
        let (limiter, clock) = test_limiter(5, 100);
        limiter.is_allowed("a");
        clock.set(50);
        limiter.is_allowed("b");

        clock.set(120);
        assert_eq!(limiter.cleanup_expired(), 1);
        assert_eq!(limiter.entry_count(), 1);
        assert_eq!(limiter.cleanup_expired(), 0);
    }

    #[test]
    fn test_reset_clears_key() {
        let (limiter, _clock) = test_limiter(1, 1000);
        limiter.is_allowed("a");
        assert!(!limiter.is_allowed("a").allowed);

        limiter.reset("a");

        assert!(limiter.is_allowed("a").allowed);
    }

    #[test]
    fn test_prefix_is_applied() {
        let clock = Arc::new(ManualClock::new(0));
        let mut store = MemoryStore::new();
        store.insert(FullKey::new("auth", "k"), RateLimitEntry { count: 5, reset_time: 10_000 });

        let limiter = RateLimiter::with_parts(RateLimiterConfig::auth_attempts(), clock, store).unwrap();

        assert!(!limiter.is_allowed("k").allowed);
    }

    #[test]
    fn test_clear_counters() {
        let (limiter, _clock) = test_limiter(3, 1000);
        limiter.is_allowed("a");
        limiter.is_allowed("b");

        limiter.clear();
        assert_eq!(limiter.entry_count(), 0);
    }
}
