//! Shared test helpers for the guardian crates.
//!
//! Provides the canned Databricks statement responses under this crate's
//! directory, an executor wrapper that records every statement and can be
//! told to fail specific ones, and sample approval requests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;

use guardian_core::errors::{ErrorKind, ExecutorError};
use guardian_core::models::{ApprovalRequest, QueryOutput, Statement};
use guardian_core::{IQueryExecutor, SqlDialect};

/// Root directory of the fixture files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// List all JSON files in a fixture subdirectory.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read directory {}: {}", dir.display(), e))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension().is_some_and(|ext| ext == "json").then_some(path)
        })
        .collect();
    files.sort();
    files
}

/// A sample approval request expiring in 30 days.
pub fn sample_request(resource_id: &str, workspace_id: &str) -> ApprovalRequest {
    ApprovalRequest {
        resource_id: resource_id.to_string(),
        workspace_id: workspace_id.to_string(),
        resource_name: format!("cluster-{resource_id}"),
        resource_type: Some("cluster".to_string()),
        workspace_name: format!("workspace-{workspace_id}"),
        resource_creator: "creator@example.com".to_string(),
        approved_by: "admin@example.com".to_string(),
        expiration_date: Some(Utc::now() + Duration::days(30)),
        justification: "needed for nightly ETL".to_string(),
    }
}

#[derive(Debug, Clone)]
struct Fault {
    pattern: String,
    kind: ErrorKind,
    remaining: Option<usize>,
}

/// Wraps a real executor, records each statement's SQL, and fails
/// statements whose SQL contains an injected pattern.
pub struct RecordingExecutor {
    inner: Arc<dyn IQueryExecutor>,
    log: Mutex<Vec<String>>,
    faults: Mutex<Vec<Fault>>,
}

impl RecordingExecutor {
    pub fn new(inner: Arc<dyn IQueryExecutor>) -> Self {
        Self {
            inner,
            log: Mutex::new(Vec::new()),
            faults: Mutex::new(Vec::new()),
        }
    }

    /// Fail every statement whose SQL contains `pattern`.
    pub fn fail_when(&self, pattern: &str, kind: ErrorKind) {
        self.push_fault(pattern, kind, None);
    }

    /// Fail only the next `times` statements whose SQL contains `pattern`.
    pub fn fail_times(&self, pattern: &str, kind: ErrorKind, times: usize) {
        self.push_fault(pattern, kind, Some(times));
    }

    pub fn clear_faults(&self) {
        self.faults.lock().unwrap().clear();
    }

    fn push_fault(&self, pattern: &str, kind: ErrorKind, remaining: Option<usize>) {
        self.faults.lock().unwrap().push(Fault {
            pattern: pattern.to_string(),
            kind,
            remaining,
        });
    }

    /// SQL of every statement seen so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn statement_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Statements that change schema: `CREATE`, `ALTER` or `DROP`.
    pub fn ddl_statements(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| is_ddl(sql))
            .collect()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|sql| sql.contains(pattern))
            .count()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    fn injected_fault(&self, sql: &str) -> Option<ErrorKind> {
        let mut faults = self.faults.lock().unwrap();
        let fault = faults
            .iter_mut()
            .find(|f| sql.contains(&f.pattern) && f.remaining != Some(0))?;
        if let Some(remaining) = fault.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(fault.kind)
    }
}

fn is_ddl(sql: &str) -> bool {
    let head = sql.trim_start().to_ascii_uppercase();
    ["CREATE", "ALTER", "DROP"]
        .iter()
        .any(|kw| head.starts_with(kw))
}

impl IQueryExecutor for RecordingExecutor {
    fn dialect(&self) -> SqlDialect {
        self.inner.dialect()
    }

    fn execute(&self, statement: &Statement) -> Result<QueryOutput, ExecutorError> {
        self.log.lock().unwrap().push(statement.sql.clone());
        if let Some(kind) = self.injected_fault(&statement.sql) {
            return Err(ExecutorError::new(kind, format!("injected {kind:?} failure")));
        }
        self.inner.execute(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn databricks_fixtures_parse_as_json() {
        let files = list_fixtures("databricks");
        assert_eq!(files.len(), 6, "expected 6 databricks fixtures");
        for file in &files {
            let content = std::fs::read_to_string(file).unwrap();
            let _: serde_json::Value = serde_json::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", file.display(), e));
        }
    }

    #[test]
    fn ddl_detection() {
        assert!(is_ddl("  CREATE TABLE x (a INT)"));
        assert!(is_ddl("alter table x add column b"));
        assert!(!is_ddl("SELECT 1"));
        assert!(!is_ddl("INSERT INTO x VALUES (1)"));
    }

    #[test]
    fn sample_request_is_approvable() {
        let request = sample_request("r1", "w1");
        assert!(guardian_core::ApprovalRecord::approve(request, Utc::now()).is_ok());
    }
}
