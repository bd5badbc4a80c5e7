//! Namespace configuration.

use serde::{Deserialize, Serialize};

use super::defaults;

/// Where the audit table lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceConfig {
    /// Audit table identifier: `catalog.schema.table` or `schema.table`.
    pub identifier: String,
    /// Catalog used when `identifier` has only two segments.
    pub default_catalog: String,
    /// Ledger table name, placed in the same schema as the audit table.
    pub ledger_table: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            identifier: defaults::default_identifier(),
            default_catalog: defaults::DEFAULT_CATALOG.to_string(),
            ledger_table: defaults::DEFAULT_LEDGER_TABLE.to_string(),
        }
    }
}

impl NamespaceConfig {
    /// Config for an explicit identifier, other fields defaulted.
    pub fn for_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Replace the schema segment of `identifier`, keeping catalog and table.
    pub fn with_schema(&mut self, schema: &str) {
        let mut segments: Vec<&str> = self.identifier.split('.').collect();
        if segments.len() >= 2 {
            let idx = segments.len() - 2;
            segments[idx] = schema;
            self.identifier = segments.join(".");
        }
    }
}
