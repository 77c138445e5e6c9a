//! In-process cache store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::store::{CacheError, CacheStore, CachedMapping};

/// A cache store backed by a `HashMap`
///
/// Entries live as long as the store does. Useful for embedding the client in a
/// long-running process and for tests.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CachedMapping>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<CachedMapping>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn forever(&self, key: &str, value: &CachedMapping) -> Result<(), CacheError> {
        self.entries.write().insert(key.to_string(), value.clone());
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().remove(key);
        Ok(())
    }
}
