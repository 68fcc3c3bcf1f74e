//! Configuration management for tourguard.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

use crate::error::{Result, TourguardError};
use crate::ratelimit::RateLimiterConfig;

/// Prefix for environment variable overrides, e.g. `TOURGUARD__LOGGING__LEVEL`.
pub const ENV_PREFIX: &str = "TOURGUARD";

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourguardConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Limiter policies by name
    #[serde(default = "default_limiters")]
    pub limiters: BTreeMap<String, RateLimiterConfig>,
}

impl Default for TourguardConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            limiters: default_limiters(),
        }
    }
}

fn default_limiters() -> BTreeMap<String, RateLimiterConfig> {
    let mut limiters = BTreeMap::new();
    limiters.insert("portal".to_string(), RateLimiterConfig::portal_access());
    limiters.insert("auth".to_string(), RateLimiterConfig::auth_attempts());
    limiters
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter; `RUST_LOG` takes precedence when set
    #[serde(default = "default_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl TourguardConfig {
    /// Load configuration from an optional YAML file plus `TOURGUARD__*`
    /// environment overrides, then validate it.
    ///
    /// Sources deep-merge over the built-in defaults, so a file or variable
    /// that sets one field of one limiter leaves everything else in place.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&TourguardConfig::default())
            .map_err(|e| TourguardError::Config(e.to_string()))?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration");
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            );
        }

        let config: TourguardConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| TourguardError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: TourguardConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TourguardError::Config(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every limiter policy and that no two limiters share a key prefix.
    pub fn validate(&self) -> Result<()> {
        let mut prefixes: HashMap<&str, &str> = HashMap::new();

        for (name, limiter) in &self.limiters {
            if name.is_empty() {
                return Err(TourguardError::Config("limiter name must not be empty".to_string()));
            }
            limiter.validate()?;

            if let Some(other) = prefixes.insert(&limiter.key_prefix, name) {
                return Err(TourguardError::Config(format!(
                    "limiters '{}' and '{}' share key_prefix '{}'",
                    other, name, limiter.key_prefix
                )));
            }
        }
        Ok(())
    }

    /// Render the effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
