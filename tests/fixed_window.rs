//! Behavioral tests for the fixed-window limiter through the public API.

use std::sync::Arc;

use tourguard::ratelimit::{
    fingerprint, ClientSignals, ManualClock, RateLimitDecision, RateLimiter, RateLimiterConfig,
};

const MAX: u32 = 3;
const WINDOW: u64 = 1000;

fn limiter_at(start_ms: u64) -> (RateLimiter<Arc<ManualClock>>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_ms));
    let limiter = RateLimiter::with_clock(RateLimiterConfig::new(MAX, WINDOW, "test"), clock.clone())
        .expect("valid config");
    (limiter, clock)
}

#[test]
fn test_quota_counts_down_to_zero() {
    let (limiter, _clock) = limiter_at(0);

    let remaining: Vec<u32> = (0..MAX)
        .map(|_| {
            let decision = limiter.is_allowed("k");
            assert!(decision.allowed);
            decision.remaining
        })
        .collect();

    assert_eq!(remaining, vec![2, 1, 0]);
}

#[test]
fn test_saturation_denies_without_counting() {
    let (limiter, clock) = limiter_at(0);
    for _ in 0..MAX {
        limiter.is_allowed("k");
    }

    clock.advance(500);
    let denied = limiter.is_allowed("k");

    assert_eq!(
        denied,
        RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time: WINDOW
        }
    );
    assert_eq!(limiter.status("k").count, MAX);
}

#[test]
fn test_window_rollover() {
    let (limiter, clock) = limiter_at(0);
    for _ in 0..=MAX {
        limiter.is_allowed("k");
    }

    clock.set(WINDOW + 250);
    let decision = limiter.is_allowed("k");

    assert!(decision.allowed);
    assert_eq!(decision.remaining, MAX - 1);
    assert_eq!(decision.reset_time, WINDOW + 250 + WINDOW);
}

#[test]
fn test_keys_are_isolated() {
    let (limiter, clock) = limiter_at(0);
    limiter.is_allowed("k2");
    let before = limiter.status("k2");

    clock.advance(100);
    for _ in 0..10 {
        limiter.is_allowed("k1");
    }
    limiter.reset("k1");

    assert_eq!(limiter.status("k2"), before);
}

#[test]
fn test_status_is_pure() {
    let (limiter, _clock) = limiter_at(0);

    let first = limiter.status("fresh");
    for _ in 0..5 {
        assert_eq!(limiter.status("fresh"), first);
    }
    assert_eq!(limiter.entry_count(), 0);

    limiter.is_allowed("used");
    let first = limiter.status("used");
    for _ in 0..5 {
        assert_eq!(limiter.status("used"), first);
    }
    assert_eq!(first.count, 1);
}

#[test]
fn test_reset_is_idempotent() {
    let (limiter, _clock) = limiter_at(0);
    limiter.is_allowed("k");
    limiter.is_allowed("k");

    limiter.reset("k");
    let status = limiter.status("k");
    assert_eq!(status.count, 0);
    assert_eq!(status.remaining, MAX);

    limiter.reset("k");
    limiter.reset("never-seen");
    assert_eq!(limiter.entry_count(), 0);
}

#[test]
fn test_documented_scenario() {
    let (limiter, clock) = limiter_at(0);
    let at = |t: u64| {
        clock.set(t);
        limiter.is_allowed("a")
    };

    assert_eq!(at(0), RateLimitDecision { allowed: true, remaining: 2, reset_time: 1000 });
    assert_eq!(at(10), RateLimitDecision { allowed: true, remaining: 1, reset_time: 1000 });
    assert_eq!(at(20), RateLimitDecision { allowed: true, remaining: 0, reset_time: 1000 });
    assert_eq!(at(30), RateLimitDecision { allowed: false, remaining: 0, reset_time: 1000 });
    assert_eq!(at(1001), RateLimitDecision { allowed: true, remaining: 2, reset_time: 2001 });
}

#[test]
fn test_shared_limiter_across_threads() {
    let (limiter, _clock) = limiter_at(0);
    let limiter = Arc::new(limiter);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = limiter.clone();
            std::thread::spawn(move || limiter.is_allowed("busy").allowed)
        })
        .collect();

    let allowed = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|allowed| *allowed)
        .count();

    assert_eq!(allowed, MAX as usize);
}

#[test]
fn test_fingerprint_as_key() {
    let (limiter, _clock) = limiter_at(0);
    let phone = fingerprint(&ClientSignals::new("Mobile Safari", "fr-FR", "Europe/Paris"));
    let laptop = fingerprint(&ClientSignals::new("Firefox", "fr-FR", "Europe/Paris"));

    for _ in 0..MAX {
        limiter.is_allowed(&phone);
    }

    assert!(!limiter.is_allowed(&phone).allowed);
    assert!(limiter.is_allowed(&laptop).allowed);
}
