//! Top-level guardian configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{BackendKind, ExecutorConfig, MigrationConfig, NamespaceConfig, ObservabilityConfig};
use crate::errors::ConfigError;
use crate::models::namespace::{validate_segment, TableName};

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`apply_env_overrides`)
/// 2. TOML file (`from_file`)
/// 3. Compiled defaults (`config::defaults`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GuardianConfig {
    pub namespace: NamespaceConfig,
    pub executor: ExecutorConfig,
    pub migrations: MigrationConfig,
    pub observability: ObservabilityConfig,
}

impl GuardianConfig {
    /// Load an optional TOML file, apply process env overrides, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Parse configuration from a TOML file. Missing keys take defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// `GUARDIAN_TABLE` replaces the identifier first; `APP_CATALOG` and
    /// `APP_SCHEMA` then replace individual segments of it.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(identifier) = get("GUARDIAN_TABLE") {
            self.namespace.identifier = identifier;
        }
        if let Some(catalog) = get("APP_CATALOG") {
            let segments: Vec<&str> = self.namespace.identifier.split('.').collect();
            if segments.len() == 3 {
                self.namespace.identifier = format!("{catalog}.{}.{}", segments[1], segments[2]);
            }
            self.namespace.default_catalog = catalog;
        }
        if let Some(schema) = get("APP_SCHEMA") {
            self.namespace.with_schema(&schema);
        }
        if let Some(backend) = get("GUARDIAN_BACKEND") {
            match backend.to_ascii_lowercase().as_str() {
                "sqlite" => self.executor.backend = BackendKind::Sqlite,
                "databricks" => self.executor.backend = BackendKind::Databricks,
                _ => {}
            }
        }
        if let Some(path) = get("GUARDIAN_SQLITE_PATH") {
            self.executor.sqlite.path = path;
        }
        if let Some(host) = get("DATABRICKS_HOST") {
            self.executor.databricks.host = host;
        }
        if let Some(token) = get("DATABRICKS_TOKEN") {
            self.executor.databricks.token = token;
        }
        if let Some(warehouse_id) = get("DATABRICKS_WAREHOUSE_ID") {
            self.executor.databricks.warehouse_id = warehouse_id;
        }
        if let Some(level) = get("LOG_LEVEL") {
            self.observability.log_level = level.to_ascii_lowercase();
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let audit = TableName::parse(&self.namespace.identifier, &self.namespace.default_catalog)?;
        validate_segment(&self.namespace.ledger_table).map_err(
            |reason| ConfigError::ValidationFailed {
                field: "namespace.ledger_table".to_string(),
                message: reason,
            },
        )?;
        if self.namespace.ledger_table == audit.table {
            return Err(ConfigError::ValidationFailed {
                field: "namespace.ledger_table".to_string(),
                message: "must differ from the audit table name".to_string(),
            });
        }
        if self.migrations.conflict_recheck_attempts == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "migrations.conflict_recheck_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.migrations.initialize_deadline_secs == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "migrations.initialize_deadline_secs".to_string(),
                message: "must be greater than 0 when set".to_string(),
            });
        }
        match self.executor.backend {
            BackendKind::Sqlite => {
                if self.executor.sqlite.path.trim().is_empty() {
                    return Err(ConfigError::ValidationFailed {
                        field: "executor.sqlite.path".to_string(),
                        message: "must not be empty".to_string(),
                    });
                }
            }
            BackendKind::Databricks => self.validate_databricks()?,
        }
        Ok(())
    }

    fn validate_databricks(&self) -> Result<(), ConfigError> {
        let db = &self.executor.databricks;
        for (field, value) in [
            ("executor.databricks.host", &db.host),
            ("executor.databricks.token", &db.token),
            ("executor.databricks.warehouse_id", &db.warehouse_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: field.to_string(),
                    message: "must be set for the databricks backend".to_string(),
                });
            }
        }
        if !(db.host.starts_with("https://") || db.host.starts_with("http://")) {
            return Err(ConfigError::ValidationFailed {
                field: "executor.databricks.host".to_string(),
                message: "must be an http(s) URL".to_string(),
            });
        }
        if !(5..=50).contains(&db.wait_timeout_secs) {
            return Err(ConfigError::ValidationFailed {
                field: "executor.databricks.wait_timeout_secs".to_string(),
                message: "must be between 5 and 50".to_string(),
            });
        }
        Ok(())
    }
}
