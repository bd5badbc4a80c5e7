/// Guardian storage version.
pub const GUARDIAN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable read by `init_tracing` for per-target log levels.
pub const LOG_ENV_VAR: &str = "GUARDIAN_LOG";

/// Filter used when `GUARDIAN_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "guardian=info";

/// Maximum number of SQL characters echoed into debug logs.
pub const MAX_LOGGED_SQL_CHARS: usize = 120;

/// Name of the audit-table column added by migration 2.
pub const REVOKED_REASON_COLUMN: &str = "revoked_reason";

/// Name of the audit-table column added by migration 3.
pub const RESOURCE_TYPE_COLUMN: &str = "resource_type";

/// SQLite metadata table emulating the catalog level of the namespace.
pub const SQLITE_CATALOG_TABLE: &str = "guardian_catalogs";

/// SQLite metadata table emulating the schema level of the namespace.
pub const SQLITE_SCHEMA_TABLE: &str = "guardian_schemas";
