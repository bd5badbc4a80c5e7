//! Namespace resolution: parse the configured identifier, require the
//! catalog, ensure the schema.
//!
//! Catalogs are provisioned by an administrator and are never created
//! here. Schemas are created on demand.

use guardian_core::config::NamespaceConfig;
use guardian_core::errors::{ErrorKind, ExecutorError, GuardianResult, NamespaceError};
use guardian_core::models::{ResolvedNamespace, TableName};
use guardian_core::IQueryExecutor;

use crate::deadline::Deadline;

pub struct NamespaceResolver<'a> {
    executor: &'a dyn IQueryExecutor,
}

impl<'a> NamespaceResolver<'a> {
    pub fn new(executor: &'a dyn IQueryExecutor) -> Self {
        Self { executor }
    }

    /// Parse the configured identifier without touching the backend.
    pub fn parse(config: &NamespaceConfig) -> GuardianResult<(TableName, TableName)> {
        let audit = TableName::parse(&config.identifier, &config.default_catalog)?;
        let ledger = audit.sibling(&config.ledger_table)?;
        Ok((audit, ledger))
    }

    /// Verify the catalog, ensure the schema, and return the resolved tables.
    pub fn resolve(
        &self,
        config: &NamespaceConfig,
        deadline: &Deadline,
    ) -> GuardianResult<ResolvedNamespace> {
        let (audit_table, ledger_table) = Self::parse(config)?;

        deadline.check("catalog check")?;
        self.ensure_catalog(&audit_table.catalog)?;

        deadline.check("schema check")?;
        let schema_created = self.ensure_schema(&audit_table.catalog, &audit_table.schema)?;

        Ok(ResolvedNamespace {
            audit_table,
            ledger_table,
            schema_created,
        })
    }

    fn ensure_catalog(&self, catalog: &str) -> Result<(), NamespaceError> {
        let probe = self.executor.dialect().catalog_exists(catalog);
        match self.executor.execute(&probe) {
            Ok(output) if !output.is_empty() => {
                tracing::debug!(catalog, "catalog exists");
                Ok(())
            }
            Ok(_) => Err(catalog_missing(catalog)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(catalog_missing(catalog)),
            Err(e) => Err(probe_error(catalog, e)),
        }
    }

    /// Returns whether the schema was created by this call.
    fn ensure_schema(&self, catalog: &str, schema: &str) -> Result<bool, NamespaceError> {
        let object = format!("{catalog}.{schema}");
        let dialect = self.executor.dialect();

        match self.executor.execute(&dialect.schema_exists(catalog, schema)) {
            Ok(output) if !output.is_empty() => {
                tracing::debug!(schema = %object, "schema exists");
                return Ok(false);
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(probe_error(&object, e)),
        }

        tracing::info!(schema = %object, "schema missing, creating");
        match self.executor.execute(&dialect.create_schema(catalog, schema)) {
            Ok(_) => {
                tracing::info!(schema = %object, "schema created");
                Ok(true)
            }
            // Another instance created it between our probe and our create.
            Err(e) if e.kind() == ErrorKind::Conflict => Ok(false),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                Err(NamespaceError::PermissionDenied {
                    object,
                    message: e.message().to_string(),
                })
            }
            Err(source) => Err(NamespaceError::SchemaCreateFailed {
                catalog: catalog.to_string(),
                schema: schema.to_string(),
                source,
            }),
        }
    }
}

fn catalog_missing(catalog: &str) -> NamespaceError {
    tracing::error!(catalog, "catalog does not exist; refusing to create it");
    NamespaceError::CatalogMissing {
        catalog: catalog.to_string(),
    }
}

fn probe_error(object: &str, source: ExecutorError) -> NamespaceError {
    if source.kind() == ErrorKind::PermissionDenied {
        NamespaceError::PermissionDenied {
            object: object.to_string(),
            message: source.message().to_string(),
        }
    } else {
        NamespaceError::ProbeFailed {
            object: object.to_string(),
            source,
        }
    }
}
