//! Configuration errors.

use super::error_code::{self, GuardianErrorCode};

/// Errors that can occur during configuration loading and validation,
/// including a malformed table identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Invalid table identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },
}

impl GuardianErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
