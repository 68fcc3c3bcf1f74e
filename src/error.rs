//! Error types for tourguard.

use thiserror::Error;

/// Main error type for tourguard operations.
///
/// Limiter checks themselves never fail; a denied request is reported through
/// [`crate::ratelimit::RateLimitDecision::allowed`], not through this type.
#[derive(Error, Debug)]
pub enum TourguardError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A named limiter was requested that the registry does not know
    #[error("Unknown limiter: {0}")]
    UnknownLimiter(String),

    /// Malformed console command or replay step
    #[error("Invalid command: {0}")]
    Command(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for tourguard operations.
pub type Result<T> = std::result::Result<T, TourguardError>;
