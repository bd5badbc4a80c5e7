//! v002: record why an approval was revoked.

use guardian_core::SqlDialect;

use super::MigrationTarget;

pub const VERSION: u32 = 2;
pub const DESCRIPTION: &str = "Add revoked_reason column";

pub fn statements(target: &MigrationTarget<'_>) -> Vec<String> {
    let table = target.table_ref();
    match target.dialect {
        SqlDialect::Databricks => vec![format!(
            "ALTER TABLE {table} ADD COLUMN revoked_reason STRING COMMENT 'Reason for revocation'"
        )],
        SqlDialect::Sqlite => vec![format!("ALTER TABLE {table} ADD COLUMN revoked_reason TEXT")],
    }
}
