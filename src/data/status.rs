//! Verification outcome categories reported by the Elastic Email API

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::ParseError;

/// Outcome of a single address verification
///
/// `None` is a local sentinel for a payload without a status. The API itself
/// only reports the other four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Risky,
    Unknown,
    #[default]
    None,
}

impl ValidationStatus {
    /// Every status, in wire order
    pub const ALL: [ValidationStatus; 5] = [
        ValidationStatus::Valid,
        ValidationStatus::Invalid,
        ValidationStatus::Risky,
        ValidationStatus::Unknown,
        ValidationStatus::None,
    ];

    /// Lower-case value used on the wire and in cached entries
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
            ValidationStatus::Risky => "risky",
            ValidationStatus::Unknown => "unknown",
            ValidationStatus::None => "none",
        }
    }
}

impl FromStr for ValidationStatus {
    type Err = ParseError;

    /// Parses a status case-insensitively. Unrecognized values are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ValidationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == lower)
            .ok_or_else(|| ParseError::UnknownStatus(s.to_string()))
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Serialize for ValidationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
