//! Migration errors.

use super::error_code::{self, GuardianErrorCode};
use super::ExecutorError;

/// Errors raised by migration-set validation and by the runner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error("invalid migration set: {reason}")]
    InvalidSet { reason: String },

    /// `ambiguous` is set when the backend timed out mid-DDL, so the
    /// statement may or may not have taken effect.
    #[error("migration failed at version {version} ({description}): {source}")]
    Failed {
        version: u32,
        description: String,
        ambiguous: bool,
        source: ExecutorError,
    },

    #[error("migration ledger unavailable: {source}")]
    LedgerUnavailable { source: ExecutorError },
}

impl MigrationError {
    /// Version that halted the run, if any.
    pub fn failed_version(&self) -> Option<u32> {
        match self {
            Self::Failed { version, .. } => Some(*version),
            _ => None,
        }
    }
}

impl GuardianErrorCode for MigrationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSet { .. } => error_code::INVALID_MIGRATION_SET,
            Self::Failed { .. } => error_code::MIGRATION_FAILED,
            Self::LedgerUnavailable { source } => source.error_code(),
        }
    }
}
