//! Backend-neutral query execution errors.

use serde::{Deserialize, Serialize};

use super::error_code::{self, GuardianErrorCode};

/// Classification every backend maps its native errors onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    PermissionDenied,
    NotFound,
    Timeout,
    /// Concurrent write collision, or an object that already exists.
    Conflict,
    /// Bad SQL, unknown column, or a value of the wrong type.
    SyntaxOrSchemaError,
    Unknown,
}

impl ErrorKind {
    /// Kinds worth retrying after a short wait.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Timeout | Self::Conflict)
    }
}

/// A failed statement, carrying its classification and the backend message.
///
/// Messages never contain bound parameter values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("object not found: {message}")]
    NotFound { message: String },

    #[error("statement timed out: {message}")]
    Timeout { message: String },

    #[error("write conflict: {message}")]
    Conflict { message: String },

    #[error("syntax or schema error: {message}")]
    SyntaxOrSchema { message: String },

    #[error("query execution failed: {message}")]
    Unknown { message: String },
}

impl ExecutorError {
    /// Build an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::PermissionDenied => Self::PermissionDenied { message },
            ErrorKind::NotFound => Self::NotFound { message },
            ErrorKind::Timeout => Self::Timeout { message },
            ErrorKind::Conflict => Self::Conflict { message },
            ErrorKind::SyntaxOrSchemaError => Self::SyntaxOrSchema { message },
            ErrorKind::Unknown => Self::Unknown { message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::SyntaxOrSchema { .. } => ErrorKind::SyntaxOrSchemaError,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::PermissionDenied { message }
            | Self::NotFound { message }
            | Self::Timeout { message }
            | Self::Conflict { message }
            | Self::SyntaxOrSchema { message }
            | Self::Unknown { message } => message,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

impl GuardianErrorCode for ExecutorError {
    fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::PermissionDenied => error_code::PERMISSION_DENIED,
            ErrorKind::NotFound => error_code::NOT_FOUND,
            ErrorKind::Timeout => error_code::TIMEOUT,
            ErrorKind::Conflict => error_code::CONFLICT,
            ErrorKind::SyntaxOrSchemaError => error_code::SYNTAX_OR_SCHEMA_ERROR,
            ErrorKind::Unknown => error_code::STORAGE_ERROR,
        }
    }
}
