//! GuardianErrorCode trait for stable, machine-readable error codes.

/// Every error enum implements this so callers and log pipelines can key
/// on a stable code instead of the human-readable message.
pub trait GuardianErrorCode {
    /// Returns the error code string (e.g., "CATALOG_MISSING").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CATALOG_MISSING: &str = "CATALOG_MISSING";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const SCHEMA_CREATE_FAILED: &str = "SCHEMA_CREATE_FAILED";
pub const INVALID_MIGRATION_SET: &str = "INVALID_MIGRATION_SET";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const TIMEOUT: &str = "TIMEOUT";
pub const CONFLICT: &str = "CONFLICT";
pub const SYNTAX_OR_SCHEMA_ERROR: &str = "SYNTAX_OR_SCHEMA_ERROR";
pub const DEADLINE_EXCEEDED: &str = "DEADLINE_EXCEEDED";
