//! Statement builders for the audit table. Every caller value is bound.

use chrono::{DateTime, Utc};

use guardian_core::models::{ApprovalFilter, ApprovalRecord, SqlValue, Statement, TableName};
use guardian_core::SqlDialect;

pub(super) fn upsert(
    dialect: SqlDialect,
    table: &TableName,
    record: &ApprovalRecord,
    now: DateTime<Utc>,
) -> Statement {
    Statement::new(dialect.upsert_approval_sql(table))
        .bind("resource_name", record.resource_name.as_str())
        .bind("resource_id", record.resource_id.as_str())
        .bind("workspace_id", record.workspace_id.as_str())
        .bind("workspace_name", record.workspace_name.as_str())
        .bind("resource_creator", record.resource_creator.as_str())
        .bind("resource_type", SqlValue::opt_text(record.resource_type.as_deref()))
        .bind("approved_by", record.approved_by.as_str())
        .bind("approval_date", record.approval_date)
        .bind("expiration_date", SqlValue::opt_timestamp(record.expiration_date))
        .bind("justification", record.justification.as_str())
        .bind("is_approved", true)
        .bind("updated_at", now)
}

pub(super) fn revoke(
    dialect: SqlDialect,
    table: &TableName,
    resource_id: &str,
    workspace_id: &str,
    revoked_by: &str,
    revoked_reason: &str,
    now: DateTime<Utc>,
) -> Statement {
    Statement::new(format!(
        "UPDATE {} SET is_approved = :revoked_state, revoked_date = :revoked_date, \
         revoked_by = :revoked_by, revoked_reason = :revoked_reason, updated_at = :updated_at \
         WHERE resource_id = :resource_id AND workspace_id = :workspace_id \
         AND is_approved = :approved_state",
        dialect.table_ref(table)
    ))
    .bind("revoked_state", false)
    .bind("revoked_date", now)
    .bind("revoked_by", revoked_by)
    .bind("revoked_reason", revoked_reason)
    .bind("updated_at", now)
    .bind("resource_id", resource_id)
    .bind("workspace_id", workspace_id)
    .bind("approved_state", true)
}

pub(super) fn select(dialect: SqlDialect, table: &TableName, filter: &ApprovalFilter) -> Statement {
    let mut clauses: Vec<&str> = Vec::new();
    let mut params: Vec<(&str, SqlValue)> = Vec::new();

    if let Some(workspace_id) = &filter.workspace_id {
        clauses.push("workspace_id = :workspace_id");
        params.push(("workspace_id", SqlValue::from(workspace_id.as_str())));
    }
    if let Some(resource_id) = &filter.resource_id {
        clauses.push("resource_id = :resource_id");
        params.push(("resource_id", SqlValue::from(resource_id.as_str())));
    }
    if filter.approved_only {
        clauses.push("is_approved = :approved_state AND revoked_date IS NULL");
        params.push(("approved_state", SqlValue::Bool(true)));
    }

    let mut sql = format!("SELECT * FROM {}", dialect.table_ref(table));
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY workspace_id, resource_id");

    params
        .into_iter()
        .fold(Statement::new(sql), |stmt, (name, value)| stmt.bind(name, value))
}

pub(super) fn describe(dialect: SqlDialect, table: &TableName) -> Statement {
    Statement::new(format!("SELECT * FROM {} LIMIT 0", dialect.table_ref(table)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableName {
        TableName::parse("main.wg.approved_resources", "main").unwrap()
    }

    #[test]
    fn select_without_filter_has_no_where() {
        let stmt = select(SqlDialect::Sqlite, &table(), &ApprovalFilter::all());
        assert!(!stmt.sql.contains("WHERE"));
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn select_binds_every_filter_value() {
        let filter = ApprovalFilter::all()
            .workspace("ws'1")
            .resource("r1")
            .approved_only();
        let stmt = select(SqlDialect::Databricks, &table(), &filter);
        assert!(stmt.sql.contains("revoked_date IS NULL"));
        assert!(!stmt.sql.contains("ws'1"));
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn revoke_only_touches_approved_rows() {
        let stmt = revoke(SqlDialect::Sqlite, &table(), "r", "w", "by", "why", Utc::now());
        assert!(stmt.sql.ends_with("AND is_approved = :approved_state"));
    }
}
