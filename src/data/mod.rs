//! Data models for Elastic Email verification results
//!
//! This module contains the verification outcome types and the decoder that
//! turns API responses and cached entries into them.

pub mod result;
pub mod status;

pub use result::ValidationResult;
pub use status::ValidationStatus;

use thiserror::Error;

/// Errors that can occur while decoding a verification payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The `result` field holds a value outside the known statuses
    #[error("Unknown validation status: '{0}'")]
    UnknownStatus(String),

    /// The payload is not a JSON object
    #[error("Invalid response payload: {0}")]
    InvalidResponse(String),
}
