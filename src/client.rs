//! Elastic Email verification API client
//!
//! Wraps the `POST /verifications/{email}` endpoint of the Elastic Email v4 API
//! behind a cache-aside lookup. Single addresses go through [`ElasticEmailClient::check`];
//! many addresses go through [`ElasticEmailClient::check_many`], which serves what it
//! can from the cache and fetches the rest concurrently.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use futures::future::join_all;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{CacheError, CacheStore};
use crate::config::{CheckOptions, ClientConfig};
use crate::data::{ParseError, ValidationResult};

/// Base URL for the Elastic Email v4 API
pub const BASE_URL: &str = "https://api.elasticemail.com/v4";

/// Prefix prepended to the raw address to form a cache key
pub const CACHE_KEY_PREFIX: &str = "elasticemail_result_";

/// Header carrying the API key
const API_KEY_HEADER: &str = "X-ElasticEmail-ApiKey";

/// Errors that can occur when verifying an address
#[derive(Debug, Error)]
pub enum ElasticEmailError {
    /// The request could not be sent or timed out
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Elastic Email API returned {status}: {body}")]
    Api { status: StatusCode, body: String },

    /// The response or cached entry could not be decoded
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The cache store failed
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// No request URL could be built for the address
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

/// Outcome of a batch check, keyed by email address
///
/// Successful entries are keyed by the address the result reports; failed
/// entries by the address that was requested. If a failed address and a reported
/// address are equal, only one of the two entries is kept.
pub type BatchResults = HashMap<String, Result<ValidationResult, ElasticEmailError>>;

/// Client for the Elastic Email verification API
#[derive(Clone)]
pub struct ElasticEmailClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Optional store for cached results
    cache: Option<Arc<dyn CacheStore>>,
    config: ClientConfig,
    /// Base URL for the API (allows override for testing)
    base_url: String,
}

impl ElasticEmailClient {
    /// Creates a client without a cache
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Creates a client with a custom HTTP client
    pub fn with_client(config: ClientConfig, http_client: Client) -> Self {
        Self {
            http_client,
            cache: None,
            config,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Attaches a cache store
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Cache key for an address. The address is used verbatim.
    pub fn cache_key(email: &str) -> String {
        format!("{}{}", CACHE_KEY_PREFIX, email)
    }

    /// Verifies a single address
    ///
    /// # Behavior
    /// - With `fresh`, forgets the cached entry and always calls the API
    /// - Otherwise returns the cached result when one exists
    /// - On a miss, calls the API once; failures are not retried
    /// - With `should_cache`, stores the result under the address's key with no expiry
    ///
    /// # Errors
    /// * `ElasticEmailError::Api` on a non-success response
    /// * `ElasticEmailError::Http` if the request fails or times out
    /// * `ElasticEmailError::Parse` if the payload holds an unknown status
    /// * `ElasticEmailError::Cache` if the cache store fails
    pub async fn check(
        &self,
        email: &str,
        options: CheckOptions,
    ) -> Result<ValidationResult, ElasticEmailError> {
        let result = match self.fetch_from_cache(email, options)? {
            Some(cached) => cached,
            None => self.fetch_from_api(email).await?,
        };

        if options.should_cache {
            self.store_in_cache(email, &result)?;
        }

        Ok(result)
    }

    /// Verifies many addresses, fetching cache misses concurrently
    ///
    /// Duplicate addresses are checked once. Cached results are used unless
    /// `fresh` is set; every remaining address gets its own request, all in flight
    /// at the same time. The call waits for every request to settle.
    ///
    /// A failure for one address is reported in that address's entry and does not
    /// affect the others. With `should_cache`, results fetched from the API are
    /// stored in the cache.
    pub async fn check_many<I, S>(&self, emails: I, options: CheckOptions) -> BatchResults
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let emails: HashSet<String> = emails.into_iter().map(Into::into).collect();

        let mut hits = BatchResults::new();
        let mut misses = Vec::new();

        for email in emails {
            match self.fetch_from_cache(&email, options) {
                Ok(Some(cached)) => {
                    hits.insert(cached.email.clone(), Ok(cached));
                }
                Ok(None) => misses.push(email),
                Err(e) => {
                    warn!(email = %email, error = %e, "cache lookup failed");
                    hits.insert(email, Err(e));
                }
            }
        }

        if misses.is_empty() {
            return hits;
        }

        debug!(misses = misses.len(), hits = hits.len(), "fetching uncached addresses");

        let responses = join_all(misses.iter().map(|email| self.fetch_from_api(email))).await;

        let mut results = BatchResults::with_capacity(misses.len() + hits.len());
        for (email, response) in misses.into_iter().zip(responses) {
            let outcome = response.and_then(|result| {
                if options.should_cache {
                    self.store_in_cache(&email, &result)?;
                }
                Ok(result)
            });

            match outcome {
                Ok(result) => {
                    results.insert(result.email.clone(), Ok(result));
                }
                Err(e) => {
                    warn!(email = %email, error = %e, "verification failed");
                    results.insert(email, Err(e));
                }
            }
        }

        results.extend(hits);
        results
    }

    /// Looks up a cached result, or forgets it when `fresh` is set
    fn fetch_from_cache(
        &self,
        email: &str,
        options: CheckOptions,
    ) -> Result<Option<ValidationResult>, ElasticEmailError> {
        let Some(cache) = &self.cache else {
            return Ok(None);
        };
        let cache_key = Self::cache_key(email);

        if options.fresh {
            cache.forget(&cache_key)?;
            debug!(email, "fresh check, cached result forgotten");
            return Ok(None);
        }

        match cache.get(&cache_key)? {
            Some(mapping) if !mapping.is_empty() => {
                debug!(email, "cache hit");
                Ok(Some(ValidationResult::parse(&mapping)?))
            }
            _ => {
                debug!(email, "cache miss");
                Ok(None)
            }
        }
    }

    fn store_in_cache(
        &self,
        email: &str,
        result: &ValidationResult,
    ) -> Result<(), ElasticEmailError> {
        if let Some(cache) = &self.cache {
            cache.forever(&Self::cache_key(email), &result.to_cacheable_mapping())?;
        }
        Ok(())
    }

    /// Fetches a verification result directly from the API
    async fn fetch_from_api(&self, email: &str) -> Result<ValidationResult, ElasticEmailError> {
        let url = self.verification_url(email)?;

        let response = self
            .http_client
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(ACCEPT, "application/json")
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ElasticEmailError::Api { status, body });
        }

        let body = response.bytes().await?;
        Ok(ValidationResult::from_response_body(&body)?)
    }

    /// `{base_url}/verifications/{email}` with the address encoded as one path segment
    fn verification_url(&self, email: &str) -> Result<Url, ElasticEmailError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ElasticEmailError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| ElasticEmailError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push("verifications")
            .push(email);

        Ok(url)
    }
}

impl fmt::Debug for ElasticEmailClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElasticEmailClient")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}
