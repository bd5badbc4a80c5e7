//! Namespace resolution errors.

use super::error_code::{self, GuardianErrorCode};
use super::ExecutorError;

/// Errors raised while verifying the catalog and ensuring the schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamespaceError {
    #[error("catalog '{catalog}' does not exist; it must be provisioned by a catalog administrator")]
    CatalogMissing { catalog: String },

    #[error("permission denied on {object}: {message}")]
    PermissionDenied { object: String, message: String },

    #[error("failed to create schema {catalog}.{schema}: {source}")]
    SchemaCreateFailed {
        catalog: String,
        schema: String,
        source: ExecutorError,
    },

    #[error("namespace probe for {object} failed: {source}")]
    ProbeFailed {
        object: String,
        source: ExecutorError,
    },
}

impl GuardianErrorCode for NamespaceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CatalogMissing { .. } => error_code::CATALOG_MISSING,
            Self::PermissionDenied { .. } => error_code::PERMISSION_DENIED,
            Self::SchemaCreateFailed { .. } => error_code::SCHEMA_CREATE_FAILED,
            Self::ProbeFailed { source, .. } => source.error_code(),
        }
    }
}
