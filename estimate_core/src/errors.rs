//! # Error Types
//!
//! Structured error types for estimate_core. The estimation pipeline itself is
//! total and never fails; these errors come from the edges: validating a
//! hand-built [`ScopeInput`](crate::scope::ScopeInput), reading job files and
//! settings, or naming a rule set that does not exist.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::errors::{CalcError, CalcResult};
//!
//! fn validate_rate(dollar_per_hour: f64) -> CalcResult<()> {
//!     if dollar_per_hour <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "dollar_per_hour",
//!             dollar_per_hour.to_string(),
//!             "Rate must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for estimate_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for everything around the estimation pipeline.
///
/// Each variant carries enough context to point at the offending field or
/// file without re-parsing the message.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value violates a scope invariant
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Rule set identifier not recognized
    #[error("Unknown rule set: '{name}' (expected one of: {expected})")]
    UnknownRuleSet { name: String, expected: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Settings file could not be parsed
    #[error("Config error in '{path}': {reason}")]
    ConfigError { path: String, reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnknownRuleSet error
    pub fn unknown_rule_set(name: impl Into<String>, expected: impl Into<String>) -> Self {
        CalcError::UnknownRuleSet {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConfigError
    pub fn config_error(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnknownRuleSet { .. } => "UNKNOWN_RULE_SET",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("stories", "7", "Stories must be between 1 and 4");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("scope").error_code(), "MISSING_FIELD");
        assert_eq!(
            CalcError::unknown_rule_set("v3", "revised, original").error_code(),
            "UNKNOWN_RULE_SET"
        );
        assert_eq!(CalcError::config_error("estimate.toml", "bad").error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_error_display() {
        let error = CalcError::file_error("open", "job.estimate.json", "not found");
        assert_eq!(
            error.to_string(),
            "File error: open on 'job.estimate.json' - not found"
        );
    }
}
