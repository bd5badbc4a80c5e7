//! Local SQLite backend.
//!
//! SQLite has no catalogs or schemas, so the three-level namespace is
//! emulated: catalogs and schemas are rows in two registry tables and a
//! table `c.s.t` is stored under the quoted name `"c.s.t"`. Catalogs are
//! only ever added by [`SqliteExecutor::register_catalog`], the local
//! stand-in for a catalog administrator.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, Connection, ErrorCode};

use guardian_core::config::SqliteConfig;
use guardian_core::constants::{SQLITE_CATALOG_TABLE, SQLITE_SCHEMA_TABLE};
use guardian_core::errors::{ErrorKind, ExecutorError};
use guardian_core::models::namespace::validate_segment;
use guardian_core::models::{format_timestamp, QueryOutput, SqlValue, Statement};
use guardian_core::{IQueryExecutor, SqlDialect};

use super::truncate_sql;

/// One SQLite connection behind a mutex.
///
/// Open several executors on the same file to model several service
/// instances; WAL and the busy timeout let them contend safely.
pub struct SqliteExecutor {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteExecutor {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> Result<Self, ExecutorError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(classify_sqlite_error)?;
        conn.busy_timeout(busy_timeout).map_err(classify_sqlite_error)?;
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(classify_sqlite_error)?;
        if !mode.eq_ignore_ascii_case("wal") {
            tracing::warn!(mode = %mode, "sqlite did not switch to WAL journaling");
        }
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(classify_sqlite_error)?;
        bootstrap_registry(&conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite database");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, ExecutorError> {
        let conn = Connection::open_in_memory().map_err(classify_sqlite_error)?;
        bootstrap_registry(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Open from config; the path `:memory:` selects an in-memory database.
    pub fn open_with_config(config: &SqliteConfig) -> Result<Self, ExecutorError> {
        if config.path == ":memory:" {
            Self::open_in_memory()
        } else {
            Self::open(
                &config.path,
                Duration::from_millis(u64::from(config.busy_timeout_ms)),
            )
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Provision a catalog. Operator-side only: the storage engine never
    /// calls this.
    pub fn register_catalog(&self, catalog: &str) -> Result<(), ExecutorError> {
        validate_segment(catalog).map_err(|reason| ExecutorError::SyntaxOrSchema {
            message: format!("invalid catalog name: {reason}"),
        })?;
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT OR IGNORE INTO {SQLITE_CATALOG_TABLE} (name, registered_at) VALUES (?1, ?2)"),
            params![catalog, format_timestamp(&Utc::now())],
        )
        .map_err(classify_sqlite_error)?;
        tracing::info!(catalog, "registered catalog");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, ExecutorError> {
        self.conn.lock().map_err(|_| ExecutorError::Unknown {
            message: "sqlite connection mutex poisoned".to_string(),
        })
    }
}

impl IQueryExecutor for SqliteExecutor {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn execute(&self, statement: &Statement) -> Result<QueryOutput, ExecutorError> {
        tracing::debug!(
            sql = %truncate_sql(&statement.sql),
            params = statement.params.len(),
            "executing sqlite statement"
        );
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&statement.sql).map_err(classify_sqlite_error)?;

        for (name, value) in &statement.params {
            let idx = stmt
                .parameter_index(&format!(":{name}"))
                .map_err(classify_sqlite_error)?
                .ok_or_else(|| ExecutorError::SyntaxOrSchema {
                    message: format!("statement has no parameter :{name}"),
                })?;
            stmt.raw_bind_parameter(idx, to_sqlite_value(value))
                .map_err(classify_sqlite_error)?;
        }

        if stmt.column_count() == 0 {
            let changed = stmt.raw_execute().map_err(classify_sqlite_error)?;
            return Ok(QueryOutput::affected(changed as u64));
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut rows = stmt.raw_query();
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(classify_sqlite_error)? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(from_sqlite_value(row.get_ref(idx).map_err(classify_sqlite_error)?));
            }
            out.push(values);
        }
        Ok(QueryOutput {
            columns,
            rows: out,
            affected_rows: 0,
        })
    }
}

fn bootstrap_registry(conn: &Connection) -> Result<(), ExecutorError> {
    conn.execute_batch(&format!(
        "
        CREATE TABLE IF NOT EXISTS {SQLITE_CATALOG_TABLE} (
            name           TEXT PRIMARY KEY,
            registered_at  TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS {SQLITE_SCHEMA_TABLE} (
            catalog  TEXT NOT NULL,
            name     TEXT NOT NULL,
            PRIMARY KEY (catalog, name)
        );
        "
    ))
    .map_err(classify_sqlite_error)
}

fn to_sqlite_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Int(i) => Value::Integer(*i),
        SqlValue::Double(d) => Value::Real(*d),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Timestamp(ts) => Value::Text(format_timestamp(ts)),
    }
}

fn from_sqlite_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Int(i),
        ValueRef::Real(f) => SqlValue::Double(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Map a rusqlite error onto the backend-neutral kinds.
pub(crate) fn classify_sqlite_error(err: rusqlite::Error) -> ExecutorError {
    let message = err.to_string();
    let kind = match &err {
        rusqlite::Error::SqliteFailure(ffi, _) => match ffi.code {
            ErrorCode::ConstraintViolation => ErrorKind::Conflict,
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::OperationInterrupted => {
                ErrorKind::Timeout
            }
            ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly
            | ErrorCode::AuthorizationForStatementDenied => ErrorKind::PermissionDenied,
            ErrorCode::TypeMismatch => ErrorKind::SyntaxOrSchemaError,
            _ => classify_sqlite_message(&message),
        },
        rusqlite::Error::MultipleStatement
        | rusqlite::Error::InvalidParameterName(_)
        | rusqlite::Error::InvalidColumnName(_)
        | rusqlite::Error::InvalidColumnIndex(_)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => ErrorKind::SyntaxOrSchemaError,
        _ => classify_sqlite_message(&message),
    };
    ExecutorError::new(kind, message)
}

/// Generic `SQLITE_ERROR` failures only carry their meaning in the message.
pub(crate) fn classify_sqlite_message(message: &str) -> ErrorKind {
    let lower = message.to_ascii_lowercase();
    if lower.contains("already exists") || lower.contains("duplicate column") {
        ErrorKind::Conflict
    } else if lower.contains("no such table") {
        ErrorKind::NotFound
    } else if lower.contains("syntax error")
        || lower.contains("no such column")
        || lower.contains("has no column")
        || lower.contains("datatype mismatch")
    {
        ErrorKind::SyntaxOrSchemaError
    } else if lower.contains("database is locked") || lower.contains("database is busy") {
        ErrorKind::Timeout
    } else {
        ErrorKind::Unknown
    }
}
