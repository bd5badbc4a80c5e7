//! Audit-table row to `ApprovalRecord`.

use guardian_core::errors::ExecutorError;
use guardian_core::models::{ApprovalRecord, RowRef};

/// Columns added by later migrations map to `None` when absent or null.
pub(super) fn map_approval(row: RowRef<'_>) -> Result<ApprovalRecord, ExecutorError> {
    Ok(ApprovalRecord {
        resource_id: row.text("resource_id")?,
        workspace_id: row.text("workspace_id")?,
        resource_name: row.opt_text("resource_name")?.unwrap_or_default(),
        resource_type: row.opt_text("resource_type")?,
        workspace_name: row.opt_text("workspace_name")?.unwrap_or_default(),
        resource_creator: row.opt_text("resource_creator")?.unwrap_or_default(),
        approved_by: row.opt_text("approved_by")?.unwrap_or_default(),
        approval_date: row.timestamp("approval_date")?,
        expiration_date: row.opt_timestamp("expiration_date")?,
        justification: row.opt_text("justification")?.unwrap_or_default(),
        is_approved: row.bool("is_approved")?,
        revoked_date: row.opt_timestamp("revoked_date")?,
        revoked_by: row.opt_text("revoked_by")?,
        revoked_reason: row.opt_text("revoked_reason")?,
        updated_at: row.timestamp("updated_at")?,
    })
}
