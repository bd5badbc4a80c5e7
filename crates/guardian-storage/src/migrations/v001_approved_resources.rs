//! v001: the approved_resources audit table.

use guardian_core::SqlDialect;

use super::MigrationTarget;

pub const VERSION: u32 = 1;
pub const DESCRIPTION: &str = "Create approved_resources table";

pub fn statements(target: &MigrationTarget<'_>) -> Vec<String> {
    let table = target.table_ref();
    match target.dialect {
        SqlDialect::Databricks => vec![format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                resource_name     STRING COMMENT 'Name of the approved resource',
                resource_id       STRING NOT NULL COMMENT 'Unique identifier of the resource',
                workspace_id      STRING NOT NULL COMMENT 'Workspace owning the resource',
                workspace_name    STRING COMMENT 'Workspace display name',
                resource_creator  STRING COMMENT 'Principal that created the resource',
                approved_by       STRING COMMENT 'Principal that approved the resource',
                approval_date     TIMESTAMP COMMENT 'When the approval was granted',
                expiration_date   TIMESTAMP COMMENT 'When the approval lapses, if ever',
                justification     STRING COMMENT 'Reason for approval',
                is_approved       BOOLEAN COMMENT 'Current approval status',
                revoked_date      TIMESTAMP COMMENT 'When the approval was revoked',
                revoked_by        STRING COMMENT 'Principal that revoked the approval',
                updated_at        TIMESTAMP COMMENT 'Last modification time'
            ) USING DELTA
            COMMENT 'Approved workspace resources with audit trail'"
        )],
        SqlDialect::Sqlite => vec![format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                resource_name     TEXT,
                resource_id       TEXT NOT NULL,
                workspace_id      TEXT NOT NULL,
                workspace_name    TEXT,
                resource_creator  TEXT,
                approved_by       TEXT,
                approval_date     TEXT,
                expiration_date   TEXT,
                justification     TEXT,
                is_approved       INTEGER,
                revoked_date      TEXT,
                revoked_by        TEXT,
                updated_at        TEXT,
                PRIMARY KEY (resource_id, workspace_id)
            )"
        )],
    }
}
