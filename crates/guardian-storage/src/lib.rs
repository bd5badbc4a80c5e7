//! # guardian-storage
//!
//! Storage engine for the approval audit trail.
//! Resolves and verifies the `catalog.schema` namespace, applies versioned
//! forward-only migrations recorded in a ledger table, and serves the audit
//! store once the schema is current. Runs on SQLite locally or on Databricks
//! SQL through the statement execution API.

pub mod audit;
pub mod deadline;
pub mod engine;
pub mod executor;
pub mod ledger;
pub mod migrations;
pub mod resolver;

pub use audit::AuditStore;
pub use engine::{Ready, StorageEngine};
pub use executor::{DatabricksExecutor, SqliteExecutor};
pub use migrations::{MigrationDefinition, MigrationRunner, MigrationSet, RunnerState};
