//! Ledger rows and migration run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ledger row: an attempt to apply a migration version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
    pub version: u32,
    pub description: String,
    pub applied_at: DateTime<Utc>,
    pub success: bool,
}

/// What a single `Initialize` run did to the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Versions this instance applied and recorded.
    pub applied: Vec<u32>,
    /// Versions another instance applied while this one was running.
    pub skipped_concurrent: Vec<u32>,
    /// Versions already recorded before this run started.
    pub already_applied: Vec<u32>,
}

impl MigrationReport {
    /// True when this run executed no DDL.
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty() && self.skipped_concurrent.is_empty()
    }
}

/// Ledger contents compared against the defined migrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatus {
    /// Every ledger row, ordered by version then attempt time.
    pub records: Vec<MigrationRecord>,
    /// Defined versions with no successful ledger row.
    pub pending: Vec<u32>,
    pub highest_defined: u32,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.pending.is_empty()
    }

    /// Versions with failed attempts and no successful row.
    pub fn failed_versions(&self) -> Vec<u32> {
        let mut failed: Vec<u32> = self
            .records
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.version)
            .filter(|v| !self.records.iter().any(|r| r.success && r.version == *v))
            .collect();
        failed.dedup();
        failed
    }
}
