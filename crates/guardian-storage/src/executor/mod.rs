//! Query executor backends.

pub mod databricks;
pub mod sqlite;

use std::sync::Arc;

use guardian_core::config::{BackendKind, ExecutorConfig};
use guardian_core::constants::MAX_LOGGED_SQL_CHARS;
use guardian_core::errors::ExecutorError;
use guardian_core::IQueryExecutor;

pub use databricks::DatabricksExecutor;
pub use sqlite::SqliteExecutor;

/// Build the executor selected by `config.backend`.
pub fn build_executor(config: &ExecutorConfig) -> Result<Arc<dyn IQueryExecutor>, ExecutorError> {
    match config.backend {
        BackendKind::Sqlite => Ok(Arc::new(SqliteExecutor::open_with_config(&config.sqlite)?)),
        BackendKind::Databricks => Ok(Arc::new(DatabricksExecutor::new(config.databricks.clone())?)),
    }
}

/// SQL text shortened for debug logs. Never carries parameter values.
pub(crate) fn truncate_sql(sql: &str) -> String {
    let flat: String = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(MAX_LOGGED_SQL_CHARS) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_sql;

    #[test]
    fn truncate_collapses_whitespace() {
        assert_eq!(truncate_sql("SELECT  1\n  FROM t"), "SELECT 1 FROM t");
    }

    #[test]
    fn truncate_caps_length() {
        let long = "x".repeat(500);
        let out = truncate_sql(&long);
        assert!(out.ends_with("..."));
        assert!(out.len() < 200);
    }
}
