//! Migration runner configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Tuning for concurrent-startup handling and the initialize deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Ledger re-reads after a conflict before the version is declared failed.
    pub conflict_recheck_attempts: u32,
    pub conflict_recheck_interval_ms: u64,
    /// Whole-`Initialize` budget. `None` means no deadline.
    pub initialize_deadline_secs: Option<u64>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            conflict_recheck_attempts: defaults::DEFAULT_CONFLICT_RECHECK_ATTEMPTS,
            conflict_recheck_interval_ms: defaults::DEFAULT_CONFLICT_RECHECK_INTERVAL_MS,
            initialize_deadline_secs: None,
        }
    }
}

impl MigrationConfig {
    pub fn recheck_interval(&self) -> Duration {
        Duration::from_millis(self.conflict_recheck_interval_ms)
    }

    pub fn initialize_deadline(&self) -> Option<Duration> {
        self.initialize_deadline_secs.map(Duration::from_secs)
    }
}
