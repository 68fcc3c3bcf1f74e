//! Storage abstraction for rate limit entries.

use std::collections::HashMap;

use super::counter::RateLimitEntry;
use super::key::FullKey;

/// Trait for rate limit entry storage.
///
/// A limiter owns its store exclusively and serializes access to it, so
/// implementations need no internal locking.
pub trait RateLimitStore: Send {
    /// Look up the entry for a key, expired or not.
    fn get(&self, key: &FullKey) -> Option<RateLimitEntry>;

    /// Insert or replace the entry for a key.
    fn insert(&mut self, key: FullKey, entry: RateLimitEntry);

    /// Remove the entry for a key, returning it if present.
    fn remove(&mut self, key: &FullKey) -> Option<RateLimitEntry>;

    /// Keep only the entries for which `keep` returns true.
    fn retain(&mut self, keep: &mut dyn FnMut(&FullKey, &RateLimitEntry) -> bool);

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry.
    fn clear(&mut self) {
        self.retain(&mut |_, _| false);
    }
}

/// Process-local, unpersisted store. Restarting the process resets every counter.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<FullKey, RateLimitEntry>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for MemoryStore {
    fn get(&self, key: &FullKey) -> Option<RateLimitEntry> {
        self.entries.get(key).copied()
    }

    fn insert(&mut self, key: FullKey, entry: RateLimitEntry) {
        self.entries.insert(key, entry);
    }

    fn remove(&mut self, key: &FullKey) -> Option<RateLimitEntry> {
        self.entries.remove(key)
    }

    fn retain(&mut self, keep: &mut dyn FnMut(&FullKey, &RateLimitEntry) -> bool) {
        self.entries.retain(|k, v| keep(k, v));
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
