//! Migration ledger: one row per attempt to apply a migration version.
//!
//! The table has exactly four columns (`version`, `description`,
//! `applied_at`, `success`) and is append-only. At most one successful
//! row may exist per version.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;

use guardian_core::errors::{ErrorKind, ExecutorError};
use guardian_core::models::{MigrationRecord, Statement, TableName};
use guardian_core::IQueryExecutor;

pub struct MigrationLedger {
    executor: Arc<dyn IQueryExecutor>,
    table: TableName,
}

impl MigrationLedger {
    pub fn new(executor: Arc<dyn IQueryExecutor>, table: TableName) -> Self {
        Self { executor, table }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    fn table_ref(&self) -> String {
        self.executor.dialect().table_ref(&self.table)
    }

    /// Create the ledger if it is absent. Returns whether DDL ran.
    ///
    /// Probes first so that a process starting against a current schema
    /// executes no DDL at all.
    pub fn ensure_table_exists(&self) -> Result<bool, ExecutorError> {
        let dialect = self.executor.dialect();
        if !self.executor.execute(&dialect.table_exists(&self.table))?.is_empty() {
            return Ok(false);
        }
        for ddl in dialect.create_ledger(&self.table) {
            match self.executor.execute(&Statement::new(ddl)) {
                Ok(_) => {}
                // Another instance created it between the probe and here.
                Err(e) if e.kind() == ErrorKind::Conflict => {
                    tracing::debug!(table = %self.table, "ledger created concurrently");
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(table = %self.table, "created migration ledger");
        Ok(true)
    }

    pub fn row_count(&self) -> Result<u64, ExecutorError> {
        let output = self.executor.execute(&Statement::new(format!(
            "SELECT COUNT(*) AS row_count FROM {}",
            self.table_ref()
        )))?;
        match output.first() {
            Some(row) => Ok(u64::try_from(row.int("row_count")?).unwrap_or(0)),
            None => Ok(0),
        }
    }

    /// Versions with at least one successful row.
    pub fn list_applied_successful(&self) -> Result<BTreeSet<u32>, ExecutorError> {
        let output = self.executor.execute(
            &Statement::new(format!(
                "SELECT DISTINCT version FROM {} WHERE success = :success",
                self.table_ref()
            ))
            .bind("success", true),
        )?;
        output.iter().map(|row| to_version(row.int("version")?)).collect()
    }

    /// Every row, ordered by version then attempt time.
    pub fn list_records(&self) -> Result<Vec<MigrationRecord>, ExecutorError> {
        let output = self.executor.execute(&Statement::new(format!(
            "SELECT version, description, applied_at, success FROM {} \
             ORDER BY version, applied_at",
            self.table_ref()
        )))?;
        output
            .iter()
            .map(|row| {
                Ok(MigrationRecord {
                    version: to_version(row.int("version")?)?,
                    description: row.text("description")?,
                    applied_at: row.timestamp("applied_at")?,
                    success: row.bool("success")?,
                })
            })
            .collect()
    }

    /// Insert one attempt row. Recording a second success for a version
    /// fails with `Conflict`; the runner's pending computation is what
    /// keeps that from happening outside of concurrent startups.
    pub fn record(&self, version: u32, description: &str, success: bool) -> Result<(), ExecutorError> {
        let statement = self.executor.dialect().insert_ledger(
            &self.table,
            version,
            description,
            Utc::now(),
            success,
        );
        let output = self.executor.execute(&statement)?;
        if output.affected_rows == 0 {
            return Err(ExecutorError::Conflict {
                message: format!("migration {version} already recorded as applied"),
            });
        }
        tracing::debug!(version, success, "recorded migration attempt");
        Ok(())
    }
}

fn to_version(raw: i64) -> Result<u32, ExecutorError> {
    u32::try_from(raw).map_err(|_| ExecutorError::SyntaxOrSchema {
        message: format!("ledger version {raw} out of range"),
    })
}
