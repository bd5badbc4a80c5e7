//! Three-part table names (`catalog.schema.table`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

const MAX_SEGMENT_LEN: usize = 255;

/// A validated `catalog.schema.table` name.
///
/// Segments contain only ASCII letters, digits, `_` and `-`, so they can be
/// embedded in quoted SQL identifiers without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

impl TableName {
    /// Parse `catalog.schema.table`, or `schema.table` qualified with `default_catalog`.
    pub fn parse(identifier: &str, default_catalog: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidIdentifier {
            identifier: identifier.to_string(),
            reason,
        };

        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(invalid("identifier is empty".to_string()));
        }

        let segments: Vec<&str> = trimmed.split('.').collect();
        let (catalog, schema, table) = match segments.as_slice() {
            [schema, table] => (default_catalog, *schema, *table),
            [catalog, schema, table] => (*catalog, *schema, *table),
            other => {
                return Err(invalid(format!(
                    "expected 'schema.table' or 'catalog.schema.table', found {} segment(s)",
                    other.len()
                )))
            }
        };

        for (level, segment) in [("catalog", catalog), ("schema", schema), ("table", table)] {
            validate_segment(segment).map_err(|reason| invalid(format!("{level} {reason}")))?;
        }

        Ok(Self {
            catalog: catalog.to_string(),
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }

    /// Another table in the same catalog and schema.
    pub fn sibling(&self, table: &str) -> Result<Self, ConfigError> {
        validate_segment(table).map_err(|reason| ConfigError::InvalidIdentifier {
            identifier: table.to_string(),
            reason: format!("table {reason}"),
        })?;
        Ok(Self {
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            table: table.to_string(),
        })
    }

    /// `catalog.schema`
    pub fn schema_path(&self) -> String {
        format!("{}.{}", self.catalog, self.schema)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.table)
    }
}

/// Check a single identifier segment. Returns the reason on failure.
pub fn validate_segment(segment: &str) -> Result<(), String> {
    if segment.is_empty() {
        return Err("segment is empty".to_string());
    }
    if segment.len() > MAX_SEGMENT_LEN {
        return Err(format!("segment exceeds {MAX_SEGMENT_LEN} characters"));
    }
    if let Some(bad) = segment
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(format!("'{segment}' contains disallowed character {bad:?}"));
    }
    Ok(())
}

/// The tables `Initialize` resolved and verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedNamespace {
    pub audit_table: TableName,
    pub ledger_table: TableName,
    /// Whether `Initialize` created the schema on this run.
    pub schema_created: bool,
}
