//! Query executor backend configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Which executor backend `StorageEngine::from_config` builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Sqlite,
    Databricks,
}

/// Backend selection plus per-backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExecutorConfig {
    pub backend: BackendKind,
    pub sqlite: SqliteConfig,
    pub databricks: DatabricksConfig,
}

/// Local SQLite backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file path, or `:memory:`.
    pub path: String,
    pub busy_timeout_ms: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: defaults::DEFAULT_SQLITE_PATH.to_string(),
            busy_timeout_ms: defaults::DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// Databricks SQL Statement Execution API settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabricksConfig {
    /// Workspace URL, e.g. `https://adb-123.azuredatabricks.net`.
    pub host: String,
    pub token: String,
    pub warehouse_id: String,
    /// Server-side wait before the statement is cancelled. Range 5..=50.
    pub wait_timeout_secs: u64,
}

impl Default for DatabricksConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            token: String::new(),
            warehouse_id: String::new(),
            wait_timeout_secs: defaults::DEFAULT_WAIT_TIMEOUT_SECS,
        }
    }
}

impl DatabricksConfig {
    /// Client-side HTTP timeout covering the server wait plus transport.
    pub fn http_timeout_secs(&self) -> u64 {
        self.wait_timeout_secs + defaults::HTTP_TIMEOUT_SLACK_SECS
    }
}

impl fmt::Debug for DatabricksConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabricksConfig")
            .field("host", &self.host)
            .field("token", &if self.token.is_empty() { "" } else { "<redacted>" })
            .field("warehouse_id", &self.warehouse_id)
            .field("wait_timeout_secs", &self.wait_timeout_secs)
            .finish()
    }
}
