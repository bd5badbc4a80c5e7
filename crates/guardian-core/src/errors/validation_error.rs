//! Approval record validation errors.

use chrono::{DateTime, Utc};

use super::error_code::{self, GuardianErrorCode};

/// A record or request that violates an audit-table constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error("expiration date {expiration} is earlier than submission time {submitted_at}")]
    ExpirationInPast {
        expiration: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
    },

    #[error("upsert only writes approved records: {reason}")]
    NotApprovedState { reason: String },
}

impl GuardianErrorCode for ValidationError {
    fn error_code(&self) -> &'static str {
        error_code::VALIDATION_ERROR
    }
}
