//! Cache store trait and error types.

use serde_json::{Map, Value};
use thiserror::Error;

/// The plain mapping written to and read from a cache store
pub type CachedMapping = Map<String, Value>;

/// Errors that can occur during cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the backing storage failed
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The entry could not be encoded
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key/value store holding cached verification results
///
/// Implementations must be thread-safe: the batch path shares one store across
/// concurrent lookups.
pub trait CacheStore: Send + Sync {
    /// Returns the mapping stored under `key`, or `None` on a miss
    fn get(&self, key: &str) -> Result<Option<CachedMapping>, CacheError>;

    /// Stores `value` under `key` with no expiry, replacing any previous entry
    fn forever(&self, key: &str, value: &CachedMapping) -> Result<(), CacheError>;

    /// Removes the entry under `key`. Forgetting a missing key is not an error.
    fn forget(&self, key: &str) -> Result<(), CacheError>;
}
