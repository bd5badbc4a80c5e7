//! Logging configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// A bare level (`debug`) or a full filter directive (`guardian_storage=trace`).
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            json: defaults::DEFAULT_JSON_LOGS,
        }
    }
}

impl ObservabilityConfig {
    /// The `EnvFilter` directive string for this config.
    pub fn filter_directive(&self) -> String {
        if self.log_level.contains('=') {
            self.log_level.clone()
        } else {
            format!("guardian={}", self.log_level)
        }
    }
}
