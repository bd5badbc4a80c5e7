//! Error handling for the guardian store.
//! One error enum per subsystem, `thiserror` only, aggregated by `GuardianError`.

pub mod config_error;
pub mod error_code;
pub mod executor_error;
pub mod guardian_error;
pub mod migration_error;
pub mod namespace_error;
pub mod validation_error;

pub use config_error::ConfigError;
pub use error_code::GuardianErrorCode;
pub use executor_error::{ErrorKind, ExecutorError};
pub use guardian_error::{GuardianError, GuardianResult};
pub use migration_error::MigrationError;
pub use namespace_error::NamespaceError;
pub use validation_error::ValidationError;
