//! Migration runner: diff the ledger against the set and apply what is
//! pending, in ascending version order, halting at the first failure.
//!
//! State machine: `Loading -> Validating -> Diffing -> Applying(v)* -> Done`,
//! or `Failed(v)` from `Applying(v)`.

use std::time::{Duration, Instant};

use guardian_core::config::MigrationConfig;
use guardian_core::errors::{
    ErrorKind, ExecutorError, GuardianError, GuardianResult, MigrationError,
};
use guardian_core::models::{MigrationReport, Statement, TableName};
use guardian_core::{migration_span, IQueryExecutor};

use super::{MigrationDefinition, MigrationSet, MigrationTarget};
use crate::deadline::Deadline;
use crate::ledger::MigrationLedger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Loading,
    Validating,
    Diffing,
    Applying(u32),
    Done,
    Failed(u32),
}

/// How hard to look for another instance's ledger row after a conflict.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub conflict_recheck_attempts: u32,
    pub conflict_recheck_interval: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self::from(&MigrationConfig::default())
    }
}

impl From<&MigrationConfig> for RunnerOptions {
    fn from(config: &MigrationConfig) -> Self {
        Self {
            conflict_recheck_attempts: config.conflict_recheck_attempts.max(1),
            conflict_recheck_interval: config.recheck_interval(),
        }
    }
}

/// Everything the runner touches during a run.
pub struct MigrationContext<'a> {
    pub executor: &'a dyn IQueryExecutor,
    pub ledger: &'a MigrationLedger,
    pub audit_table: &'a TableName,
    pub deadline: &'a Deadline,
}

pub struct MigrationRunner<'s> {
    set: &'s MigrationSet,
    options: RunnerOptions,
    state: RunnerState,
}

impl<'s> MigrationRunner<'s> {
    pub fn new(set: &'s MigrationSet, options: RunnerOptions) -> Self {
        Self {
            set,
            options,
            state: RunnerState::Loading,
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Check the set before any table access.
    pub fn validate(&mut self) -> GuardianResult<()> {
        self.state = RunnerState::Validating;
        self.set.check()?;
        tracing::debug!(
            migrations = self.set.len(),
            highest = self.set.highest_version(),
            "migration set validated"
        );
        Ok(())
    }

    /// Bring the audit table up to the highest defined version.
    pub fn run(&mut self, ctx: &MigrationContext<'_>) -> GuardianResult<MigrationReport> {
        if self.state == RunnerState::Loading {
            self.validate()?;
        }

        self.state = RunnerState::Diffing;
        ctx.deadline.check("ledger diff")?;
        let applied = ctx
            .ledger
            .list_applied_successful()
            .map_err(|source| MigrationError::LedgerUnavailable { source })?;

        if let Some(newest) = applied.iter().next_back() {
            if *newest > self.set.highest_version() {
                tracing::warn!(
                    ledger_version = *newest,
                    defined_version = self.set.highest_version(),
                    "ledger is ahead of the defined migrations"
                );
            }
        }

        let set = self.set;
        let mut report = MigrationReport::default();
        let mut pending: Vec<&'s MigrationDefinition> = Vec::new();
        for def in set.definitions() {
            if applied.contains(&def.version) {
                report.already_applied.push(def.version);
            } else {
                pending.push(def);
            }
        }

        if pending.is_empty() {
            tracing::info!(version = self.set.highest_version(), "schema is current");
            self.state = RunnerState::Done;
            return Ok(report);
        }

        tracing::info!(
            pending = ?pending.iter().map(|d| d.version).collect::<Vec<_>>(),
            "applying pending migrations"
        );
        for def in pending {
            self.apply(def, ctx, &mut report)?;
        }

        self.state = RunnerState::Done;
        Ok(report)
    }

    fn apply(
        &mut self,
        def: &MigrationDefinition,
        ctx: &MigrationContext<'_>,
        report: &mut MigrationReport,
    ) -> GuardianResult<()> {
        ctx.deadline.check(&format!("migration {}", def.version))?;
        self.state = RunnerState::Applying(def.version);
        let span = migration_span!(def.version, def.description);
        let _entered = span.enter();

        let target = MigrationTarget {
            table: ctx.audit_table,
            dialect: ctx.executor.dialect(),
        };
        let started = Instant::now();
        let ddl = def
            .render(&target)
            .into_iter()
            .try_for_each(|sql| ctx.executor.execute(&Statement::new(sql)).map(|_| ()));

        match ddl {
            Ok(()) => match ctx.ledger.record(def.version, def.description, true) {
                Ok(()) => {
                    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    tracing::info!(version = def.version, elapsed_ms, "applied migration");
                    report.applied.push(def.version);
                    Ok(())
                }
                Err(e) if e.kind() == ErrorKind::Conflict => self.resolve_conflict(def, ctx, e, report),
                // The DDL took effect but the ledger does not say so.
                Err(e) => Err(self.fail(def, e, true)),
            },
            Err(e) if e.kind() == ErrorKind::Conflict => self.resolve_conflict(def, ctx, e, report),
            Err(e) => {
                let ambiguous = e.kind() == ErrorKind::Timeout;
                record_failure(ctx.ledger, def);
                Err(self.fail(def, e, ambiguous))
            }
        }
    }

    /// Another writer got there first, or something already exists. Skip
    /// the version if another instance has recorded it; fail otherwise.
    fn resolve_conflict(
        &mut self,
        def: &MigrationDefinition,
        ctx: &MigrationContext<'_>,
        conflict: ExecutorError,
        report: &mut MigrationReport,
    ) -> GuardianResult<()> {
        tracing::debug!(version = def.version, error = %conflict, "conflict, rechecking ledger");
        for attempt in 0..self.options.conflict_recheck_attempts {
            if attempt > 0 {
                std::thread::sleep(self.options.conflict_recheck_interval);
            }
            ctx.deadline.check(&format!("migration {} recheck", def.version))?;
            let applied = ctx
                .ledger
                .list_applied_successful()
                .map_err(|source| MigrationError::LedgerUnavailable { source })?;
            if applied.contains(&def.version) {
                tracing::info!(
                    version = def.version,
                    "migration applied concurrently by another instance, skipping"
                );
                report.skipped_concurrent.push(def.version);
                return Ok(());
            }
        }
        record_failure(ctx.ledger, def);
        Err(self.fail(def, conflict, false))
    }

    fn fail(&mut self, def: &MigrationDefinition, source: ExecutorError, ambiguous: bool) -> GuardianError {
        self.state = RunnerState::Failed(def.version);
        tracing::error!(
            version = def.version,
            kind = ?source.kind(),
            ambiguous,
            error = %source,
            "migration failed, halting"
        );
        MigrationError::Failed {
            version: def.version,
            description: def.description.to_string(),
            ambiguous,
            source,
        }
        .into()
    }
}

fn record_failure(ledger: &MigrationLedger, def: &MigrationDefinition) {
    if let Err(e) = ledger.record(def.version, def.description, false) {
        tracing::warn!(version = def.version, error = %e, "could not record failed migration attempt");
    }
}
