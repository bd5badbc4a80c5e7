//! Top-level error type aggregating every subsystem error.

use super::error_code::{self, GuardianErrorCode};
use super::{ConfigError, ExecutorError, MigrationError, NamespaceError, ValidationError};

/// Convenience alias used throughout the guardian crates.
pub type GuardianResult<T> = Result<T, GuardianError>;

/// Errors surfaced by `Initialize` and the audit store.
///
/// Everything except `Validation` and `Storage` is fatal at startup: the
/// service must not accept approval traffic after receiving one of them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardianError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Namespace error: {0}")]
    Namespace(#[from] NamespaceError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] ExecutorError),

    #[error("initialize deadline exceeded during {phase}")]
    DeadlineExceeded { phase: String },
}

impl GuardianError {
    /// The backend classification, when the error originated in a statement.
    pub fn executor_kind(&self) -> Option<crate::errors::ErrorKind> {
        match self {
            Self::Storage(e) => Some(e.kind()),
            Self::Namespace(NamespaceError::SchemaCreateFailed { source, .. })
            | Self::Namespace(NamespaceError::ProbeFailed { source, .. })
            | Self::Migration(MigrationError::Failed { source, .. })
            | Self::Migration(MigrationError::LedgerUnavailable { source }) => Some(source.kind()),
            _ => None,
        }
    }

    /// Whether retrying the operation after a short wait may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl GuardianErrorCode for GuardianError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Namespace(e) => e.error_code(),
            Self::Migration(e) => e.error_code(),
            Self::Validation(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::DeadlineExceeded { .. } => error_code::DEADLINE_EXCEEDED,
        }
    }
}
