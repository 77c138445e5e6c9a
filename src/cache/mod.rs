//! Cache stores for verification results
//!
//! The client talks to a [`CacheStore`], a small key/value capability with
//! get / forever / forget semantics. Entries never expire on their own; they stay
//! until they are overwritten or explicitly forgotten.
//!
//! Two stores ship with the crate: [`CacheManager`] persists entries as JSON files
//! in an XDG cache directory, and [`MemoryCache`] keeps them in process.

mod manager;
mod memory;
mod store;

pub use manager::CacheManager;
pub use memory::MemoryCache;
pub use store::{CacheError, CacheStore, CachedMapping};
