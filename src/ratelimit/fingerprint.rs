//! Best-effort client identity for use as a rate limit key.
//!
//! A fingerprint is derived from ambient client signals (user agent, locale,
//! timezone). It is **not** a security boundary: every input is controlled by
//! the client, so a caller can mint a fresh fingerprint per request and bypass
//! any limiter keyed on it. Distinct clients with identical environments also
//! share one fingerprint. Use an authenticated identity where throttling must
//! hold against a motivated caller.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of the hex token returned by [`fingerprint`].
pub const FINGERPRINT_LEN: usize = 32;

/// The ambient signals a fingerprint is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSignals {
    pub user_agent: String,
    pub language: String,
    pub timezone: String,
}

impl ClientSignals {
    /// Collect the signals for one client.
    pub fn new(
        user_agent: impl Into<String>,
        language: impl Into<String>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            language: language.into(),
            timezone: timezone.into(),
        }
    }
}

/// Derive a short opaque token from client signals.
pub fn fingerprint(signals: &ClientSignals) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signals.user_agent.as_bytes());
    hasher.update(b"|");
    hasher.update(signals.language.as_bytes());
    hasher.update(b"|");
    hasher.update(signals.timezone.as_bytes());

    let mut token = format!("{:x}", hasher.finalize());
    token.truncate(FINGERPRINT_LEN);
    token
}
