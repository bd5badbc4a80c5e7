//! v003: resource type (cluster, job, warehouse, ...).

use super::MigrationTarget;

pub const VERSION: u32 = 3;
pub const DESCRIPTION: &str = "Add resource_type column";

pub fn statements(target: &MigrationTarget<'_>) -> Vec<String> {
    vec![format!(
        "ALTER TABLE {} ADD COLUMN resource_type {}",
        target.table_ref(),
        target.dialect.string_type()
    )]
}
