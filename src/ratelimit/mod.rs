//! Fixed-window rate limiting logic and state management.

mod clock;
mod counter;
mod fingerprint;
mod key;
mod limiter;
mod registry;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::RateLimitEntry;
pub use fingerprint::{fingerprint, ClientSignals, FINGERPRINT_LEN};
pub use key::FullKey;
pub use limiter::{RateLimitDecision, RateLimitStatus, RateLimiter, RateLimiterConfig};
pub use registry::LimiterRegistry;
pub use store::{MemoryStore, RateLimitStore};
