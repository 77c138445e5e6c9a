//! Cache manager for persisting verification results to disk
//!
//! Provides a `CacheManager` that stores each cache entry as a JSON file. Entries
//! carry the time they were written but never expire.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::store::{CacheError, CacheStore, CachedMapping};

/// Longest file stem written to disk, well under the common 255-byte name limit
const MAX_FILE_STEM_LEN: usize = 200;

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
}

/// Manages reading and writing cached results on disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache directory
/// (`~/.cache/elastic-email/` on Linux). Keys are percent-encoded into file names,
/// so any email address maps to a single file inside the directory. Keys whose
/// encoding is too long for a file name are shortened to a prefix plus a SHA-256
/// digest of the full key.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "elastic-email")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory where cache files are stored
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", file_stem(key)))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }
}

/// Percent-encoded key, or a truncated prefix plus digest when that is too long
fn file_stem(key: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(key.as_bytes()).collect();
    if encoded.len() <= MAX_FILE_STEM_LEN {
        return encoded;
    }

    let digest = hex::encode(Sha256::digest(key.as_bytes()));
    // byte_serialize only emits ASCII, so any byte index is a char boundary
    let prefix_len = MAX_FILE_STEM_LEN - digest.len() - 1;
    format!("{}-{}", &encoded[..prefix_len], digest)
}

impl CacheStore for CacheManager {
    /// Reads an entry from disk
    ///
    /// A missing, unreadable or corrupt file counts as a miss.
    fn get(&self, key: &str) -> Result<Option<CachedMapping>, CacheError> {
        let path = self.cache_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unreadable cache file, treating as miss");
                return Ok(None);
            }
        };

        match serde_json::from_str::<CacheEntry<CachedMapping>>(&content) {
            Ok(entry) => Ok(Some(entry.data)),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "corrupt cache file, treating as miss");
                Ok(None)
            }
        }
    }

    fn forever(&self, key: &str, value: &CachedMapping) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            data: value,
            cached_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&entry)?;

        fs::write(self.cache_path(key), json)?;
        Ok(())
    }

    fn forget(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.cache_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
