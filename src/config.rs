//! Client configuration and per-call check options

use std::fmt;
use std::time::Duration;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Settings shared by every request a client makes
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Elastic Email API key, sent in the `X-ElasticEmail-ApiKey` header
    pub api_key: String,
    /// Timeout applied to each verification request
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with the default 20 second timeout
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Cache behavior for a single `check` or `check_many` call
///
/// Options are passed per call, so one client can serve callers that want
/// different cache behavior at the same time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Forget any cached entry and always ask the API
    pub fresh: bool,
    /// Store the result in the cache with no expiry
    pub should_cache: bool,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether cached entries are bypassed and invalidated
    pub fn with_fresh(mut self, fresh: bool) -> Self {
        self.fresh = fresh;
        self
    }

    /// Sets whether results are written back to the cache
    pub fn with_should_cache(mut self, should_cache: bool) -> Self {
        self.should_cache = should_cache;
        self
    }
}
