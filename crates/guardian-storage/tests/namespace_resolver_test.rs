//! Namespace resolution against the SQLite backend: catalog required,
//! schema created on demand, failures classified.

use std::sync::Arc;
use std::time::Duration;

use guardian_core::config::{GuardianConfig, NamespaceConfig};
use guardian_core::errors::{ErrorKind, GuardianError, NamespaceError};
use guardian_storage::deadline::Deadline;
use guardian_storage::resolver::NamespaceResolver;
use guardian_storage::{SqliteExecutor, StorageEngine};
use test_fixtures::RecordingExecutor;

fn recording(register_main: bool) -> Arc<RecordingExecutor> {
    let sqlite = SqliteExecutor::open_in_memory().expect("in-memory sqlite");
    if register_main {
        sqlite.register_catalog("main").expect("register catalog");
    }
    Arc::new(RecordingExecutor::new(Arc::new(sqlite)))
}

#[test]
fn creates_missing_schema_once() {
    let executor = recording(true);
    let resolver = NamespaceResolver::new(&*executor);
    let config = NamespaceConfig::default();

    let first = resolver.resolve(&config, &Deadline::none()).unwrap();
    assert!(first.schema_created);
    assert_eq!(first.audit_table.to_string(), "main.workspace_guardian.approved_resources");
    assert_eq!(
        first.ledger_table.to_string(),
        "main.workspace_guardian.migration_definitions"
    );

    let second = resolver.resolve(&config, &Deadline::none()).unwrap();
    assert!(!second.schema_created);
}

#[test]
fn missing_catalog_is_never_created() {
    let executor = recording(false);
    let resolver = NamespaceResolver::new(&*executor);

    let err = resolver
        .resolve(&NamespaceConfig::default(), &Deadline::none())
        .unwrap_err();
    assert_eq!(
        err,
        GuardianError::Namespace(NamespaceError::CatalogMissing {
            catalog: "main".to_string()
        })
    );
    assert_eq!(executor.statement_count(), 1, "only the catalog probe runs");
    assert_eq!(executor.count_matching("INSERT"), 0);
}

#[test]
fn catalog_probe_not_found_means_missing() {
    let executor = recording(true);
    executor.fail_when("guardian_catalogs", ErrorKind::NotFound);
    let resolver = NamespaceResolver::new(&*executor);

    let err = resolver
        .resolve(&NamespaceConfig::default(), &Deadline::none())
        .unwrap_err();
    assert!(matches!(
        err,
        GuardianError::Namespace(NamespaceError::CatalogMissing { .. })
    ));
}

#[test]
fn two_part_identifier_uses_default_catalog() {
    let sqlite = SqliteExecutor::open_in_memory().unwrap();
    sqlite.register_catalog("hive").unwrap();
    let resolver = NamespaceResolver::new(&sqlite);
    let config = NamespaceConfig {
        identifier: "ops.approvals".to_string(),
        default_catalog: "hive".to_string(),
        ..NamespaceConfig::default()
    };

    let resolved = resolver.resolve(&config, &Deadline::none()).unwrap();
    assert_eq!(resolved.audit_table.to_string(), "hive.ops.approvals");
    assert_eq!(resolved.ledger_table.to_string(), "hive.ops.migration_definitions");
}

#[test]
fn schema_create_permission_denied() {
    let executor = recording(true);
    executor.fail_when("INSERT OR IGNORE INTO guardian_schemas", ErrorKind::PermissionDenied);
    let resolver = NamespaceResolver::new(&*executor);

    let err = resolver
        .resolve(&NamespaceConfig::default(), &Deadline::none())
        .unwrap_err();
    match err {
        GuardianError::Namespace(NamespaceError::PermissionDenied { object, .. }) => {
            assert_eq!(object, "main.workspace_guardian");
        }
        other => panic!("expected PermissionDenied, got {other:?}"),
    }
}

#[test]
fn schema_create_other_failure() {
    let executor = recording(true);
    executor.fail_when("INSERT OR IGNORE INTO guardian_schemas", ErrorKind::Unknown);
    let resolver = NamespaceResolver::new(&*executor);

    let err = resolver
        .resolve(&NamespaceConfig::default(), &Deadline::none())
        .unwrap_err();
    assert!(matches!(
        err,
        GuardianError::Namespace(NamespaceError::SchemaCreateFailed { .. })
    ));
    assert_eq!(err.executor_kind(), Some(ErrorKind::Unknown));
}

#[test]
fn schema_create_conflict_means_created_elsewhere() {
    let executor = recording(true);
    executor.fail_times("INSERT OR IGNORE INTO guardian_schemas", ErrorKind::Conflict, 1);
    let resolver = NamespaceResolver::new(&*executor);

    let resolved = resolver
        .resolve(&NamespaceConfig::default(), &Deadline::none())
        .unwrap();
    assert!(!resolved.schema_created);
}

#[test]
fn invalid_identifier_touches_nothing() {
    let executor = recording(true);
    let resolver = NamespaceResolver::new(&*executor);
    let config = NamespaceConfig::for_identifier("a.b.c.d");

    let err = resolver.resolve(&config, &Deadline::none()).unwrap_err();
    assert!(matches!(err, GuardianError::Config(_)));
    assert_eq!(executor.statement_count(), 0);
}

#[test]
fn expired_deadline_stops_before_probing() {
    let executor = recording(true);
    let resolver = NamespaceResolver::new(&*executor);

    let err = resolver
        .resolve(&NamespaceConfig::default(), &Deadline::after(Duration::ZERO))
        .unwrap_err();
    assert!(matches!(err, GuardianError::DeadlineExceeded { .. }));
    assert_eq!(executor.statement_count(), 0);
}

#[test]
fn initialize_with_missing_catalog_runs_no_ddl() {
    let executor = recording(false);
    let engine = StorageEngine::new(executor.clone(), GuardianConfig::default());

    let err = engine.initialize().unwrap_err();
    assert!(matches!(
        err,
        GuardianError::Namespace(NamespaceError::CatalogMissing { .. })
    ));
    assert!(executor.ddl_statements().is_empty());
}
