//! SQL dialect fragments for the two supported backends.
//!
//! Everything backend-specific the store needs lives here: how a
//! three-part name is rendered, column type names, namespace probes, and
//! the two statements that need an upsert (ledger record, approval upsert).

use serde::{Deserialize, Serialize};

use crate::constants::{SQLITE_CATALOG_TABLE, SQLITE_SCHEMA_TABLE};
use crate::models::{SqlValue, Statement, TableName};

/// Audit-table columns written by an approval upsert, in insert order.
pub const APPROVAL_UPSERT_COLUMNS: &[&str] = &[
    "resource_name",
    "resource_id",
    "workspace_id",
    "workspace_name",
    "resource_creator",
    "resource_type",
    "approved_by",
    "approval_date",
    "expiration_date",
    "justification",
    "is_approved",
    "updated_at",
];

/// Columns an upsert resets to NULL.
const REVOCATION_COLUMNS: &[&str] = &["revoked_date", "revoked_by", "revoked_reason"];

/// Timestamp-typed columns among [`APPROVAL_UPSERT_COLUMNS`].
const TIMESTAMP_COLUMNS: &[&str] = &["approval_date", "expiration_date", "updated_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlDialect {
    /// Unity Catalog via the SQL Statement Execution API.
    Databricks,
    /// Local SQLite with an emulated catalog/schema registry.
    Sqlite,
}

impl SqlDialect {
    /// Render a table reference. Segments are pre-validated, so quoting
    /// never needs escaping.
    pub fn table_ref(self, table: &TableName) -> String {
        match self {
            Self::Databricks => format!("`{}`.`{}`.`{}`", table.catalog, table.schema, table.table),
            Self::Sqlite => format!("\"{}.{}.{}\"", table.catalog, table.schema, table.table),
        }
    }

    pub fn string_type(self) -> &'static str {
        match self {
            Self::Databricks => "STRING",
            Self::Sqlite => "TEXT",
        }
    }

    pub fn timestamp_type(self) -> &'static str {
        match self {
            Self::Databricks => "TIMESTAMP",
            Self::Sqlite => "TEXT",
        }
    }

    pub fn boolean_type(self) -> &'static str {
        match self {
            Self::Databricks => "BOOLEAN",
            Self::Sqlite => "INTEGER",
        }
    }

    pub fn integer_type(self) -> &'static str {
        match self {
            Self::Databricks => "INT",
            Self::Sqlite => "INTEGER",
        }
    }

    /// Trailing clause for `CREATE TABLE`.
    pub fn table_options(self) -> &'static str {
        match self {
            Self::Databricks => " USING DELTA",
            Self::Sqlite => "",
        }
    }

    /// Returns a row iff the catalog exists. May also fail with `NotFound`.
    ///
    /// Unity Catalog stores names lowercased in `information_schema`, so the
    /// Databricks probes bind lowercased segments.
    pub fn catalog_exists(self, catalog: &str) -> Statement {
        match self {
            Self::Databricks => Statement::new(format!(
                "SELECT catalog_name FROM `{catalog}`.information_schema.catalogs \
                 WHERE catalog_name = :catalog"
            ))
            .bind("catalog", catalog.to_ascii_lowercase()),
            Self::Sqlite => Statement::new(format!(
                "SELECT name FROM {SQLITE_CATALOG_TABLE} WHERE name = :catalog"
            ))
            .bind("catalog", catalog),
        }
    }

    /// Returns a row iff the schema exists.
    pub fn schema_exists(self, catalog: &str, schema: &str) -> Statement {
        match self {
            Self::Databricks => Statement::new(format!(
                "SELECT schema_name FROM `{catalog}`.information_schema.schemata \
                 WHERE schema_name = :schema"
            ))
            .bind("schema", schema.to_ascii_lowercase()),
            Self::Sqlite => Statement::new(format!(
                "SELECT name FROM {SQLITE_SCHEMA_TABLE} WHERE catalog = :catalog AND name = :schema"
            ))
            .bind("catalog", catalog)
            .bind("schema", schema),
        }
    }

    /// Idempotent schema creation.
    pub fn create_schema(self, catalog: &str, schema: &str) -> Statement {
        match self {
            Self::Databricks => {
                Statement::new(format!("CREATE SCHEMA IF NOT EXISTS `{catalog}`.`{schema}`"))
            }
            Self::Sqlite => Statement::new(format!(
                "INSERT OR IGNORE INTO {SQLITE_SCHEMA_TABLE} (catalog, name) VALUES (:catalog, :schema)"
            ))
            .bind("catalog", catalog)
            .bind("schema", schema),
        }
    }

    /// Returns a row iff the table exists.
    pub fn table_exists(self, table: &TableName) -> Statement {
        match self {
            Self::Databricks => Statement::new(format!(
                "SELECT table_name FROM `{}`.information_schema.tables \
                 WHERE table_schema = :schema AND table_name = :table",
                table.catalog
            ))
            .bind("schema", table.schema.to_ascii_lowercase())
            .bind("table", table.table.to_ascii_lowercase()),
            Self::Sqlite => Statement::new(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = :table",
            )
            .bind("table", table.to_string()),
        }
    }

    /// DDL creating the ledger, uniqueness enforced on successful rows only.
    pub fn create_ledger(self, table: &TableName) -> Vec<String> {
        let ledger = self.table_ref(table);
        let columns = format!(
            "version {int} NOT NULL, description {string} NOT NULL, \
             applied_at {ts} NOT NULL, success {boolean} NOT NULL",
            int = self.integer_type(),
            string = self.string_type(),
            ts = self.timestamp_type(),
            boolean = self.boolean_type(),
        );
        match self {
            Self::Databricks => vec![format!(
                "CREATE TABLE IF NOT EXISTS {ledger} ({columns}){} \
                 COMMENT 'Applied schema migrations'",
                self.table_options()
            )],
            Self::Sqlite => vec![
                format!("CREATE TABLE IF NOT EXISTS {ledger} ({columns})"),
                format!(
                    "CREATE UNIQUE INDEX IF NOT EXISTS \"{table}.success_version\" \
                     ON {ledger} (version) WHERE success = 1"
                ),
            ],
        }
    }

    /// Insert one ledger row. A second success row for the same version
    /// affects zero rows (Databricks) or violates the unique index (SQLite).
    pub fn insert_ledger(
        self,
        table: &TableName,
        version: u32,
        description: &str,
        applied_at: chrono::DateTime<chrono::Utc>,
        success: bool,
    ) -> Statement {
        let ledger = self.table_ref(table);
        let sql = match self {
            Self::Databricks => format!(
                "MERGE INTO {ledger} AS target \
                 USING (SELECT CAST(:version AS INT) AS version, :description AS description, \
                 CAST(:applied_at AS TIMESTAMP) AS applied_at, :success AS success) AS source \
                 ON target.version = source.version AND target.success = true AND source.success = true \
                 WHEN NOT MATCHED THEN INSERT (version, description, applied_at, success) \
                 VALUES (source.version, source.description, source.applied_at, source.success)"
            ),
            Self::Sqlite => format!(
                "INSERT INTO {ledger} (version, description, applied_at, success) \
                 VALUES (:version, :description, :applied_at, :success)"
            ),
        };
        Statement::new(sql)
            .bind("version", version)
            .bind("description", description)
            .bind("applied_at", applied_at)
            .bind("success", success)
    }

    /// Full-row replace keyed on `(resource_id, workspace_id)`. Binds every
    /// name in [`APPROVAL_UPSERT_COLUMNS`]; revocation columns reset to NULL.
    pub fn upsert_approval_sql(self, table: &TableName) -> String {
        let target = self.table_ref(table);
        let insert_columns: Vec<&str> = APPROVAL_UPSERT_COLUMNS
            .iter()
            .chain(REVOCATION_COLUMNS)
            .copied()
            .collect();
        match self {
            Self::Databricks => {
                let source_columns: Vec<String> = APPROVAL_UPSERT_COLUMNS
                    .iter()
                    .map(|c| {
                        if TIMESTAMP_COLUMNS.contains(c) {
                            format!("CAST(:{c} AS TIMESTAMP) AS {c}")
                        } else {
                            format!(":{c} AS {c}")
                        }
                    })
                    .chain(REVOCATION_COLUMNS.iter().map(|c| {
                        let ty = if *c == "revoked_date" { "TIMESTAMP" } else { "STRING" };
                        format!("CAST(NULL AS {ty}) AS {c}")
                    }))
                    .collect();
                let updates: Vec<String> = insert_columns
                    .iter()
                    .filter(|c| !matches!(**c, "resource_id" | "workspace_id"))
                    .map(|c| format!("target.{c} = source.{c}"))
                    .collect();
                let values: Vec<String> = insert_columns.iter().map(|c| format!("source.{c}")).collect();
                format!(
                    "MERGE INTO {target} AS target USING (SELECT {}) AS source \
                     ON target.resource_id = source.resource_id AND target.workspace_id = source.workspace_id \
                     WHEN MATCHED THEN UPDATE SET {} \
                     WHEN NOT MATCHED THEN INSERT ({}) VALUES ({})",
                    source_columns.join(", "),
                    updates.join(", "),
                    insert_columns.join(", "),
                    values.join(", "),
                )
            }
            Self::Sqlite => {
                let values: Vec<String> = APPROVAL_UPSERT_COLUMNS
                    .iter()
                    .map(|c| format!(":{c}"))
                    .chain(REVOCATION_COLUMNS.iter().map(|_| "NULL".to_string()))
                    .collect();
                let updates: Vec<String> = insert_columns
                    .iter()
                    .filter(|c| !matches!(**c, "resource_id" | "workspace_id"))
                    .map(|c| format!("{c} = excluded.{c}"))
                    .collect();
                format!(
                    "INSERT INTO {target} ({}) VALUES ({}) \
                     ON CONFLICT (resource_id, workspace_id) DO UPDATE SET {}",
                    insert_columns.join(", "),
                    values.join(", "),
                    updates.join(", "),
                )
            }
        }
    }
}

/// Type tag the Databricks statement API expects for a parameter value.
pub fn databricks_param_type(value: &SqlValue) -> &'static str {
    match value {
        SqlValue::Null | SqlValue::Text(_) => "STRING",
        SqlValue::Bool(_) => "BOOLEAN",
        SqlValue::Int(_) => "BIGINT",
        SqlValue::Double(_) => "DOUBLE",
        SqlValue::Timestamp(_) => "TIMESTAMP",
    }
}
