//! Command-line interface parsing for the elastic-email binary
//!
//! This module handles parsing of CLI arguments using clap, turning them into a
//! client configuration, per-call check options and a cache store, and renders
//! results for the terminal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::cache::{CacheManager, CacheStore};
use crate::client::BatchResults;
use crate::config::{CheckOptions, ClientConfig, DEFAULT_TIMEOUT_SECS};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// An address argument was blank
    #[error("Invalid email address: '{0}'")]
    EmptyEmail(String),

    /// The timeout must be at least one second
    #[error("Invalid timeout: {0}. The timeout must be at least 1 second")]
    InvalidTimeout(u64),

    /// No cache directory could be determined and none was given
    #[error("Could not determine a cache directory; pass --cache-dir or --no-cache")]
    NoCacheDir,
}

/// Verify email addresses with the Elastic Email API
#[derive(Parser, Debug)]
#[command(name = "elastic-email")]
#[command(about = "Verify email addresses with the Elastic Email API")]
#[command(version)]
pub struct Cli {
    /// Email addresses to verify
    #[arg(required = true, value_name = "EMAIL")]
    pub emails: Vec<String>,

    /// Elastic Email API key
    #[arg(long, env = "ELASTIC_EMAIL_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Ignore and forget cached results, always asking the API
    #[arg(long)]
    pub fresh: bool,

    /// Store results in the cache with no expiry
    #[arg(long = "cache")]
    pub should_cache: bool,

    /// Run without a cache store
    #[arg(long, conflicts_with_all = ["should_cache", "cache_dir"])]
    pub no_cache: bool,

    /// Directory for cached results (defaults to the user cache directory)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Print results as a JSON object keyed by email
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where cached results live for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLocation {
    Disabled,
    /// The XDG cache directory
    Default,
    Dir(PathBuf),
}

/// Everything the binary needs to run, derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub emails: Vec<String>,
    pub client: ClientConfig,
    pub options: CheckOptions,
    pub cache: CacheLocation,
    pub json: bool,
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with appropriate settings
    /// * `Err(CliError)` if an address is blank or the timeout is zero
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.timeout == 0 {
            return Err(CliError::InvalidTimeout(cli.timeout));
        }

        let mut emails = Vec::with_capacity(cli.emails.len());
        for email in &cli.emails {
            let trimmed = email.trim();
            if trimmed.is_empty() {
                return Err(CliError::EmptyEmail(email.clone()));
            }
            emails.push(trimmed.to_string());
        }

        let cache = match (&cli.cache_dir, cli.no_cache) {
            (_, true) => CacheLocation::Disabled,
            (Some(dir), false) => CacheLocation::Dir(dir.clone()),
            (None, false) => CacheLocation::Default,
        };

        Ok(RunConfig {
            emails,
            client: ClientConfig::new(cli.api_key.clone())
                .with_timeout(Duration::from_secs(cli.timeout)),
            options: CheckOptions::new()
                .with_fresh(cli.fresh)
                .with_should_cache(cli.should_cache),
            cache,
            json: cli.json,
        })
    }

    /// Opens the configured cache store, if any
    pub fn build_cache(&self) -> Result<Option<Arc<dyn CacheStore>>, CliError> {
        match &self.cache {
            CacheLocation::Disabled => Ok(None),
            CacheLocation::Default => {
                let manager = CacheManager::new().ok_or(CliError::NoCacheDir)?;
                Ok(Some(Arc::new(manager)))
            }
            CacheLocation::Dir(dir) => Ok(Some(Arc::new(CacheManager::with_dir(dir.clone())))),
        }
    }
}

/// Renders one line per address, sorted by address
pub fn format_results(results: &BatchResults) -> String {
    let mut emails: Vec<&String> = results.keys().collect();
    emails.sort();

    let width = emails.iter().map(|e| e.len()).max().unwrap_or(0);

    let mut out = String::new();
    for email in emails {
        let line = match &results[email] {
            Ok(result) => {
                let mut flags = Vec::new();
                if result.disposable {
                    flags.push("disposable");
                }
                if result.role {
                    flags.push("role");
                }
                let mut line = format!("{:<width$}  {:<7}", email, result.result, width = width);
                if !flags.is_empty() {
                    line.push_str(&format!("  [{}]", flags.join(", ")));
                }
                if !result.suggested_spelling.is_empty() {
                    line.push_str(&format!("  did you mean {}?", result.suggested_spelling));
                }
                if !result.reason.is_empty() {
                    line.push_str(&format!("  ({})", result.reason));
                }
                line
            }
            Err(e) => format!("{:<width$}  error: {}", email, e, width = width),
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Builds a JSON object keyed by address; failures become `{"error": "..."}`
pub fn results_to_json(results: &BatchResults) -> Value {
    let mut map = Map::new();
    for (email, outcome) in results {
        let value = match outcome {
            Ok(result) => serde_json::to_value(result).unwrap_or(Value::Null),
            Err(e) => json!({ "error": e.to_string() }),
        };
        map.insert(email.clone(), value);
    }
    Value::Object(map)
}

/// Whether every address was verified without error
pub fn all_succeeded(results: &BatchResults) -> bool {
    results.values().all(|r| r.is_ok())
}
