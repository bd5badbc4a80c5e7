//! The approval audit store.
//!
//! Only reachable through [`crate::Ready`], so no read or write can reach
//! the audit table before `Initialize` has brought the schema current.

mod queries;
mod row_mapper;

use std::sync::Arc;

use chrono::Utc;

use guardian_core::audit_span;
use guardian_core::errors::GuardianResult;
use guardian_core::models::approval::require_non_empty;
use guardian_core::models::{ApprovalFilter, ApprovalRecord, RevokeOutcome, TableName};
use guardian_core::IQueryExecutor;

#[derive(Clone)]
pub struct AuditStore {
    executor: Arc<dyn IQueryExecutor>,
    table: TableName,
}

impl std::fmt::Debug for AuditStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditStore")
            .field("table", &self.table)
            .field("dialect", &self.executor.dialect())
            .finish()
    }
}

impl AuditStore {
    pub(crate) fn new(executor: Arc<dyn IQueryExecutor>, table: TableName) -> Self {
        Self { executor, table }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Insert or fully replace the row for the record's
    /// `(resource_id, workspace_id)`. Revocation fields are cleared and
    /// `updated_at` is set to the current time.
    pub fn upsert(&self, record: &ApprovalRecord) -> GuardianResult<()> {
        let now = Utc::now();
        record.validate_for_upsert(now)?;

        let span = audit_span!("upsert", record.resource_id);
        let _entered = span.enter();
        let statement = queries::upsert(self.executor.dialect(), &self.table, record, now);
        self.executor.execute(&statement)?;
        tracing::info!(workspace_id = %record.workspace_id, "approval upserted");
        Ok(())
    }

    /// Revoke the approved row for `(resource_id, workspace_id)`.
    ///
    /// Only a currently approved row changes; revoking an already revoked
    /// or unknown resource returns `NotApproved` and writes nothing.
    pub fn revoke(
        &self,
        resource_id: &str,
        workspace_id: &str,
        revoked_by: &str,
        revoked_reason: &str,
    ) -> GuardianResult<RevokeOutcome> {
        require_non_empty("resource_id", resource_id)?;
        require_non_empty("workspace_id", workspace_id)?;
        require_non_empty("revoked_by", revoked_by)?;
        require_non_empty("revoked_reason", revoked_reason)?;

        let span = audit_span!("revoke", resource_id);
        let _entered = span.enter();
        let statement = queries::revoke(
            self.executor.dialect(),
            &self.table,
            resource_id,
            workspace_id,
            revoked_by,
            revoked_reason,
            Utc::now(),
        );
        let output = self.executor.execute(&statement)?;
        if output.affected_rows == 0 {
            tracing::info!(workspace_id, "no approved row to revoke");
            return Ok(RevokeOutcome::NotApproved);
        }
        tracing::info!(workspace_id, "approval revoked");
        Ok(RevokeOutcome::Revoked)
    }

    /// Rows matching `filter`, ordered by workspace then resource.
    pub fn query(&self, filter: &ApprovalFilter) -> GuardianResult<Vec<ApprovalRecord>> {
        let statement = queries::select(self.executor.dialect(), &self.table, filter);
        let output = self.executor.execute(&statement)?;
        let records = output
            .iter()
            .map(row_mapper::map_approval)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(rows = records.len(), "approval query");
        Ok(records)
    }

    /// The row for `(resource_id, workspace_id)`, in any state.
    pub fn find(&self, resource_id: &str, workspace_id: &str) -> GuardianResult<Option<ApprovalRecord>> {
        let filter = ApprovalFilter::all().resource(resource_id).workspace(workspace_id);
        Ok(self.query(&filter)?.into_iter().next())
    }

    /// The approved, unrevoked, unexpired row for the pair, if any.
    pub fn active_approval(
        &self,
        resource_id: &str,
        workspace_id: &str,
    ) -> GuardianResult<Option<ApprovalRecord>> {
        let filter = ApprovalFilter::all()
            .resource(resource_id)
            .workspace(workspace_id)
            .approved_only();
        let now = Utc::now();
        Ok(self
            .query(&filter)?
            .into_iter()
            .find(|record| record.is_active_at(now)))
    }

    /// Current audit-table column names, in table order.
    pub fn describe_columns(&self) -> GuardianResult<Vec<String>> {
        let statement = queries::describe(self.executor.dialect(), &self.table);
        Ok(self.executor.execute(&statement)?.columns)
    }
}
