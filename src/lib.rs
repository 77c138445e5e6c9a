//! Elastic Email verification client
//!
//! Verifies email addresses against the Elastic Email v4 API with an optional
//! cache-aside result store. Single addresses are checked with
//! [`ElasticEmailClient::check`]; batches with [`ElasticEmailClient::check_many`],
//! which serves cached results and fetches the rest concurrently.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod data;

pub use cache::{CacheError, CacheManager, CacheStore, MemoryCache};
pub use client::{BatchResults, ElasticEmailClient, ElasticEmailError};
pub use config::{CheckOptions, ClientConfig};
pub use data::{ParseError, ValidationResult, ValidationStatus};
