//! Versioned, forward-only schema migrations for the audit table.
//!
//! Each `vNNN_*` module owns one version: a description and the DDL for
//! each dialect. New columns only ever arrive through a new version.

pub mod runner;
pub mod set;
pub mod v001_approved_resources;
pub mod v002_revoked_reason;
pub mod v003_resource_type;

use std::fmt;

use guardian_core::models::TableName;
use guardian_core::SqlDialect;

pub use runner::{MigrationContext, MigrationRunner, RunnerOptions, RunnerState};
pub use set::MigrationSet;

/// The audit table a migration is rendered against.
#[derive(Debug, Clone, Copy)]
pub struct MigrationTarget<'a> {
    pub table: &'a TableName,
    pub dialect: SqlDialect,
}

impl MigrationTarget<'_> {
    /// Quoted table reference for this dialect.
    pub fn table_ref(&self) -> String {
        self.dialect.table_ref(self.table)
    }
}

/// Renders a migration's DDL, one statement per element.
pub type StatementsFn = fn(&MigrationTarget<'_>) -> Vec<String>;

/// One migration version.
#[derive(Clone, Copy)]
pub struct MigrationDefinition {
    pub version: u32,
    pub description: &'static str,
    pub statements: StatementsFn,
}

impl MigrationDefinition {
    pub const fn new(version: u32, description: &'static str, statements: StatementsFn) -> Self {
        Self {
            version,
            description,
            statements,
        }
    }

    pub fn render(&self, target: &MigrationTarget<'_>) -> Vec<String> {
        (self.statements)(target)
    }
}

impl fmt::Debug for MigrationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationDefinition")
            .field("version", &self.version)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// The built-in migrations, in version order.
pub fn definitions() -> Vec<MigrationDefinition> {
    vec![
        MigrationDefinition::new(
            v001_approved_resources::VERSION,
            v001_approved_resources::DESCRIPTION,
            v001_approved_resources::statements,
        ),
        MigrationDefinition::new(
            v002_revoked_reason::VERSION,
            v002_revoked_reason::DESCRIPTION,
            v002_revoked_reason::statements,
        ),
        MigrationDefinition::new(
            v003_resource_type::VERSION,
            v003_resource_type::DESCRIPTION,
            v003_resource_type::statements,
        ),
    ]
}
