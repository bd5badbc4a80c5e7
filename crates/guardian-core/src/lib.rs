//! # guardian-core
//!
//! Foundation crate for the Workspace Guardian approval store.
//! Defines the types, traits, errors, config, tracing, and constants
//! shared by the storage engine and its backends.

pub mod config;
pub mod constants;
pub mod dialect;
pub mod errors;
pub mod models;
pub mod tracing;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::GuardianConfig;
pub use dialect::SqlDialect;
pub use errors::{ErrorKind, ExecutorError, GuardianError, GuardianResult};
pub use models::{ApprovalFilter, ApprovalRecord, ApprovalRequest, RevokeOutcome, TableName};
pub use traits::IQueryExecutor;
