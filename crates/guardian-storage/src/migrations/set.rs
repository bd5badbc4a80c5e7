//! A validated, ordered list of migration definitions.

use std::collections::HashSet;

use guardian_core::errors::MigrationError;
use guardian_core::models::TableName;
use guardian_core::SqlDialect;

use super::{definitions, MigrationDefinition, MigrationTarget};

/// Migrations sorted by version, contiguous from 1, unique, each with a
/// description and at least one statement per dialect.
///
/// Built once at startup and handed to the runner. Construction performs
/// no I/O, so an invalid set is rejected before any table is touched.
#[derive(Debug, Clone)]
pub struct MigrationSet {
    definitions: Vec<MigrationDefinition>,
}

impl MigrationSet {
    pub fn new(definitions: Vec<MigrationDefinition>) -> Result<Self, MigrationError> {
        validate(&definitions)?;
        Ok(Self { definitions })
    }

    /// The migrations shipped with this crate.
    pub fn builtin() -> Result<Self, MigrationError> {
        Self::new(definitions())
    }

    /// Re-run validation; the runner calls this in its `Validating` state.
    pub fn check(&self) -> Result<(), MigrationError> {
        validate(&self.definitions)
    }

    pub fn definitions(&self) -> &[MigrationDefinition] {
        &self.definitions
    }

    pub fn get(&self, version: u32) -> Option<&MigrationDefinition> {
        self.definitions.iter().find(|d| d.version == version)
    }

    pub fn highest_version(&self) -> u32 {
        self.definitions.last().map_or(0, |d| d.version)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn invalid(reason: String) -> MigrationError {
    MigrationError::InvalidSet { reason }
}

fn validate(definitions: &[MigrationDefinition]) -> Result<(), MigrationError> {
    if definitions.is_empty() {
        return Err(invalid("no migrations defined".to_string()));
    }

    let mut seen = HashSet::new();
    for def in definitions {
        if !seen.insert(def.version) {
            return Err(invalid(format!("duplicate migration version {}", def.version)));
        }
    }

    for pair in definitions.windows(2) {
        if pair[1].version < pair[0].version {
            return Err(invalid(format!(
                "migrations out of order: version {} listed after {}",
                pair[1].version, pair[0].version
            )));
        }
    }

    for (idx, def) in definitions.iter().enumerate() {
        let expected = u32::try_from(idx + 1).unwrap_or(u32::MAX);
        if def.version != expected {
            return Err(invalid(format!(
                "version gap: expected {expected}, found {}",
                def.version
            )));
        }
    }

    // Statements are rendered against a placeholder table; rendering is pure.
    let probe = TableName {
        catalog: "validation".to_string(),
        schema: "validation".to_string(),
        table: "validation".to_string(),
    };
    for def in definitions {
        if def.description.trim().is_empty() {
            return Err(invalid(format!("migration {} has an empty description", def.version)));
        }
        for dialect in [SqlDialect::Databricks, SqlDialect::Sqlite] {
            let rendered = def.render(&MigrationTarget {
                table: &probe,
                dialect,
            });
            if rendered.is_empty() || rendered.iter().any(|s| s.trim().is_empty()) {
                return Err(invalid(format!(
                    "migration {} has an empty statement for {dialect:?}",
                    def.version
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddl(target: &MigrationTarget<'_>) -> Vec<String> {
        vec![format!("CREATE TABLE IF NOT EXISTS {} (x TEXT)", target.table_ref())]
    }

    fn def(version: u32) -> MigrationDefinition {
        MigrationDefinition::new(version, "test", ddl)
    }

    fn reason(defs: Vec<MigrationDefinition>) -> String {
        match MigrationSet::new(defs).unwrap_err() {
            MigrationError::InvalidSet { reason } => reason,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn builtin_set_is_valid() {
        let set = MigrationSet::builtin().unwrap();
        assert_eq!(set.highest_version(), 3);
        assert_eq!(set.get(2).unwrap().description, "Add revoked_reason column");
    }

    #[test]
    fn rejects_each_malformation() {
        assert!(reason(vec![]).contains("no migrations"));
        assert!(reason(vec![def(1), def(1)]).contains("duplicate"));
        assert!(reason(vec![def(2), def(1)]).contains("out of order"));
        assert!(reason(vec![def(1), def(3)]).contains("gap"));
        assert!(reason(vec![def(2), def(3)]).contains("gap"));
        assert!(reason(vec![MigrationDefinition::new(1, "  ", ddl)]).contains("empty description"));
        assert!(reason(vec![MigrationDefinition::new(1, "x", |_| vec![])]).contains("empty statement"));
        assert!(reason(vec![MigrationDefinition::new(1, "x", |_| vec!["  ".to_string()])])
            .contains("empty statement"));
    }
}
