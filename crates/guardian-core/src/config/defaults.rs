//! Default values for all configuration. Single source of truth.

// Namespace defaults
pub const DEFAULT_CATALOG: &str = "main";
pub const DEFAULT_SCHEMA: &str = "workspace_guardian";
pub const DEFAULT_AUDIT_TABLE: &str = "approved_resources";
pub const DEFAULT_LEDGER_TABLE: &str = "migration_definitions";

// Executor defaults
pub const DEFAULT_SQLITE_PATH: &str = "guardian.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 30;
/// Slack added on top of the statement wait timeout for the HTTP round trip.
pub const HTTP_TIMEOUT_SLACK_SECS: u64 = 15;

// Migration defaults
pub const DEFAULT_CONFLICT_RECHECK_ATTEMPTS: u32 = 5;
pub const DEFAULT_CONFLICT_RECHECK_INTERVAL_MS: u64 = 200;

// Observability defaults
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;

/// The fully qualified default audit table identifier.
pub fn default_identifier() -> String {
    format!("{DEFAULT_CATALOG}.{DEFAULT_SCHEMA}.{DEFAULT_AUDIT_TABLE}")
}
