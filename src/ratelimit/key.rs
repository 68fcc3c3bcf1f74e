//! Namespaced storage keys.

/// A key that uniquely identifies a counter in a limiter's store.
///
/// The key is composed of the limiter's prefix and the caller-supplied key,
/// joined by `:`. Caller keys are not validated or escaped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullKey(String);

impl FullKey {
    /// Build the full key for `key` under `prefix`.
    pub fn new(prefix: &str, key: &str) -> Self {
        Self(format!("{}:{}", prefix, key))
    }

    /// The rendered key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FullKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
