//! `StorageEngine`: the single entry point that turns a config into a
//! ready audit store.
//!
//! `initialize` resolves the namespace, ensures the ledger, and runs the
//! migrations. Any error it returns is fatal: the caller must not serve
//! approval traffic without a [`Ready`].

use std::sync::Arc;

use guardian_core::config::GuardianConfig;
use guardian_core::errors::{GuardianResult, MigrationError};
use guardian_core::models::{MigrationReport, MigrationStatus, ResolvedNamespace};
use guardian_core::{initialize_span, IQueryExecutor};

use crate::audit::AuditStore;
use crate::deadline::Deadline;
use crate::executor::build_executor;
use crate::ledger::MigrationLedger;
use crate::migrations::{MigrationContext, MigrationRunner, MigrationSet, RunnerOptions};
use crate::resolver::NamespaceResolver;

pub struct StorageEngine {
    executor: Arc<dyn IQueryExecutor>,
    config: GuardianConfig,
    instance_id: String,
}

/// Proof that `initialize` completed. Holds the only handle to the audit store.
#[derive(Debug)]
pub struct Ready {
    audit: AuditStore,
    namespace: ResolvedNamespace,
    report: MigrationReport,
}

impl Ready {
    pub fn audit_store(&self) -> &AuditStore {
        &self.audit
    }

    pub fn into_audit_store(self) -> AuditStore {
        self.audit
    }

    pub fn namespace(&self) -> &ResolvedNamespace {
        &self.namespace
    }

    pub fn report(&self) -> &MigrationReport {
        &self.report
    }
}

impl StorageEngine {
    /// Engine over an existing executor.
    pub fn new(executor: Arc<dyn IQueryExecutor>, config: GuardianConfig) -> Self {
        Self {
            executor,
            config,
            instance_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Validate the config and build the executor it selects.
    pub fn from_config(config: GuardianConfig) -> GuardianResult<Self> {
        config.validate()?;
        let executor = build_executor(&config.executor)?;
        Ok(Self::new(executor, config))
    }

    pub fn config(&self) -> &GuardianConfig {
        &self.config
    }

    pub fn executor(&self) -> &Arc<dyn IQueryExecutor> {
        &self.executor
    }

    /// Identifies this engine in logs when several instances start together.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Initialize with the built-in migrations.
    pub fn initialize(&self) -> GuardianResult<Ready> {
        let set = MigrationSet::builtin()?;
        self.initialize_with(&set)
    }

    /// Verify the namespace, ensure the ledger, apply pending migrations
    /// from `set`, and hand back the audit store.
    pub fn initialize_with(&self, set: &MigrationSet) -> GuardianResult<Ready> {
        let span = initialize_span!(self.config.namespace.identifier, self.instance_id);
        let _entered = span.enter();
        let deadline = Deadline::from_budget(self.config.migrations.initialize_deadline());

        let mut runner = MigrationRunner::new(set, RunnerOptions::from(&self.config.migrations));
        runner.validate()?;

        let namespace = NamespaceResolver::new(self.executor.as_ref())
            .resolve(&self.config.namespace, &deadline)?;

        deadline.check("ledger setup")?;
        let ledger = MigrationLedger::new(self.executor.clone(), namespace.ledger_table.clone());
        ledger
            .ensure_table_exists()
            .map_err(|source| MigrationError::LedgerUnavailable { source })?;
        match ledger.row_count() {
            Ok(rows) => tracing::info!(table = %namespace.ledger_table, rows, "migration ledger ready"),
            Err(e) => tracing::warn!(error = %e, "could not count ledger rows"),
        }

        let report = runner.run(&MigrationContext {
            executor: self.executor.as_ref(),
            ledger: &ledger,
            audit_table: &namespace.audit_table,
            deadline: &deadline,
        })?;

        tracing::info!(
            applied = ?report.applied,
            skipped_concurrent = ?report.skipped_concurrent,
            "storage initialized"
        );
        Ok(Ready {
            audit: AuditStore::new(self.executor.clone(), namespace.audit_table.clone()),
            namespace,
            report,
        })
    }

    /// Ledger contents and pending versions, without applying anything.
    ///
    /// Reads only; a missing ledger reports every version as pending.
    pub fn migration_status(&self) -> GuardianResult<MigrationStatus> {
        self.migration_status_for(&MigrationSet::builtin()?)
    }

    pub fn migration_status_for(&self, set: &MigrationSet) -> GuardianResult<MigrationStatus> {
        let (_, ledger_table) = NamespaceResolver::parse(&self.config.namespace)?;
        let dialect = self.executor.dialect();
        let ledger_exists = !self
            .executor
            .execute(&dialect.table_exists(&ledger_table))?
            .is_empty();

        let records = if ledger_exists {
            MigrationLedger::new(self.executor.clone(), ledger_table).list_records()?
        } else {
            Vec::new()
        };
        let pending = set
            .definitions()
            .iter()
            .map(|d| d.version)
            .filter(|v| !records.iter().any(|r| r.success && r.version == *v))
            .collect();
        Ok(MigrationStatus {
            records,
            pending,
            highest_defined: set.highest_version(),
        })
    }
}
