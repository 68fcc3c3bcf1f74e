//! Named limiters built from configuration.
//!
//! Each policy in the configuration (e.g. `portal`, `auth`) gets its own
//! limiter with its own store. All limiters in a registry read one clock.

use std::collections::BTreeMap;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::limiter::{RateLimiter, RateLimiterConfig};
use crate::config::TourguardConfig;
use crate::error::{Result, TourguardError};

/// A set of limiters addressed by policy name.
pub struct LimiterRegistry<C: Clock + Clone = SystemClock> {
    limiters: BTreeMap<String, RateLimiter<C>>,
}

impl LimiterRegistry {
    /// Build a registry on the system clock.
    pub fn from_config(config: &TourguardConfig) -> Result<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock + Clone> LimiterRegistry<C> {
    /// Build a registry whose limiters all share `clock`.
    pub fn with_clock(config: &TourguardConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Self::from_policies(&config.limiters, clock)
    }

    /// Build a registry from bare policies.
    pub fn from_policies(policies: &BTreeMap<String, RateLimiterConfig>, clock: C) -> Result<Self> {
        let mut limiters = BTreeMap::new();
        for (name, policy) in policies {
            debug!(
                limiter = %name,
                max_requests = policy.max_requests,
                window_ms = policy.window_ms,
                key_prefix = %policy.key_prefix,
                "Creating limiter"
            );
            limiters.insert(name.clone(), RateLimiter::with_clock(policy.clone(), clock.clone())?);
        }
        info!(count = limiters.len(), "Limiter registry initialized");
        Ok(Self { limiters })
    }

    /// Look up a limiter by name.
    pub fn get(&self, name: &str) -> Result<&RateLimiter<C>> {
        self.limiters
            .get(name)
            .ok_or_else(|| TourguardError::UnknownLimiter(name.to_string()))
    }

    /// Names of all configured limiters, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.limiters.keys().map(String::as_str).collect()
    }

    /// Run expired-entry cleanup on every limiter, returning the total evicted.
    pub fn cleanup_all(&self) -> usize {
        self.limiters.values().map(|l| l.cleanup_expired()).sum()
    }

    /// Number of configured limiters.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    /// Whether no limiters are configured.
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}
