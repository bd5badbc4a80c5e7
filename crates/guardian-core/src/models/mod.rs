//! Domain models: approval records, migration records, namespaces, and
//! the backend-neutral statement/result values.

pub mod approval;
pub mod migration;
pub mod namespace;
pub mod value;

pub use approval::{ApprovalFilter, ApprovalRecord, ApprovalRequest, RevokeOutcome};
pub use migration::{MigrationRecord, MigrationReport, MigrationStatus};
pub use namespace::{ResolvedNamespace, TableName};
pub use value::{format_timestamp, parse_timestamp, QueryOutput, RowRef, SqlValue, Statement};
