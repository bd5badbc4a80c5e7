//! Configuration for the guardian store.
//! TOML-based, resolved as env > file > compiled defaults.

pub mod defaults;
pub mod executor_config;
pub mod guardian_config;
pub mod migration_config;
pub mod namespace_config;
pub mod observability_config;

pub use executor_config::{BackendKind, DatabricksConfig, ExecutorConfig, SqliteConfig};
pub use guardian_config::GuardianConfig;
pub use migration_config::MigrationConfig;
pub use namespace_config::NamespaceConfig;
pub use observability_config::ObservabilityConfig;
