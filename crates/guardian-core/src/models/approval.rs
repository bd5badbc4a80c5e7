//! Approval records: one row per `(resource_id, workspace_id)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// What a caller submits to approve a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub resource_id: String,
    pub workspace_id: String,
    pub resource_name: String,
    pub resource_type: Option<String>,
    pub workspace_name: String,
    pub resource_creator: String,
    pub approved_by: String,
    pub expiration_date: Option<DateTime<Utc>>,
    pub justification: String,
}

/// One audit-table row.
///
/// `revoked_reason` and `resource_type` were added by later migrations and
/// are `None` on rows written before them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub resource_id: String,
    pub workspace_id: String,
    pub resource_name: String,
    pub resource_type: Option<String>,
    pub workspace_name: String,
    pub resource_creator: String,
    pub approved_by: String,
    pub approval_date: DateTime<Utc>,
    pub expiration_date: Option<DateTime<Utc>>,
    pub justification: String,
    pub is_approved: bool,
    pub revoked_date: Option<DateTime<Utc>>,
    pub revoked_by: Option<String>,
    pub revoked_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ApprovalRecord {
    /// Build an approved record from a request submitted at `now`.
    pub fn approve(request: ApprovalRequest, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let record = Self {
            resource_id: request.resource_id,
            workspace_id: request.workspace_id,
            resource_name: request.resource_name,
            resource_type: request.resource_type,
            workspace_name: request.workspace_name,
            resource_creator: request.resource_creator,
            approved_by: request.approved_by,
            approval_date: now,
            expiration_date: request.expiration_date,
            justification: request.justification,
            is_approved: true,
            revoked_date: None,
            revoked_by: None,
            revoked_reason: None,
            updated_at: now,
        };
        record.validate_for_upsert(now)?;
        Ok(record)
    }

    /// Check the constraints an upsert enforces at submission time `now`.
    pub fn validate_for_upsert(&self, now: DateTime<Utc>) -> Result<(), ValidationError> {
        require_non_empty("resource_id", &self.resource_id)?;
        require_non_empty("workspace_id", &self.workspace_id)?;
        require_non_empty("resource_name", &self.resource_name)?;
        require_non_empty("approved_by", &self.approved_by)?;
        require_non_empty("justification", &self.justification)?;

        if let Some(expiration) = self.expiration_date {
            if expiration < now {
                return Err(ValidationError::ExpirationInPast {
                    expiration,
                    submitted_at: now,
                });
            }
        }
        if !self.is_approved {
            return Err(ValidationError::NotApprovedState {
                reason: "is_approved is false".to_string(),
            });
        }
        if self.revoked_date.is_some() || self.revoked_by.is_some() || self.revoked_reason.is_some() {
            return Err(ValidationError::NotApprovedState {
                reason: "revocation fields must be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date.is_some_and(|exp| exp < now)
    }

    /// Approved, not revoked, and not past its expiration at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.is_approved && self.revoked_date.is_none() && !self.is_expired_at(now)
    }
}

pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(())
    }
}

/// Outcome of a revoke call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevokeOutcome {
    /// The approved row flipped to revoked.
    Revoked,
    /// No approved row matched; nothing changed.
    NotApproved,
}

/// Row filter for audit-table queries. Every set field narrows the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalFilter {
    pub workspace_id: Option<String>,
    pub resource_id: Option<String>,
    /// Only `is_approved = true` rows with no revocation date.
    pub approved_only: bool,
}

impl ApprovalFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn workspace(mut self, workspace_id: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self
    }

    pub fn resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn approved_only(mut self) -> Self {
        self.approved_only = true;
        self
    }
}
