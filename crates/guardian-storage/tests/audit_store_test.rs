//! Audit store operations on an initialized SQLite store.

use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use chrono::Utc;
use guardian_core::config::GuardianConfig;
use guardian_core::errors::{GuardianError, ValidationError};
use guardian_core::{ApprovalFilter, ApprovalRecord, RevokeOutcome};
use guardian_storage::{AuditStore, SqliteExecutor, StorageEngine};
use test_fixtures::sample_request;

fn store() -> AuditStore {
    let sqlite = SqliteExecutor::open_in_memory().expect("in-memory sqlite");
    sqlite.register_catalog("main").expect("register catalog");
    StorageEngine::new(Arc::new(sqlite), GuardianConfig::default())
        .initialize()
        .expect("initialize")
        .into_audit_store()
}

fn approved(resource_id: &str, workspace_id: &str) -> ApprovalRecord {
    ApprovalRecord::approve(sample_request(resource_id, workspace_id), Utc::now()).unwrap()
}

#[test]
fn upsert_then_find() {
    let store = store();
    let record = approved("r1", "w1");
    store.upsert(&record).unwrap();

    let found = store.find("r1", "w1").unwrap().expect("row exists");
    assert!(found.is_approved);
    assert_eq!(found.resource_type.as_deref(), Some("cluster"));
    assert_eq!(found.justification, record.justification);
    assert_eq!(found.revoked_date, None);
    assert!(store.find("r1", "other").unwrap().is_none());
}

#[test]
fn upsert_replaces_row_and_advances_updated_at() {
    let store = store();
    store.upsert(&approved("r1", "w1")).unwrap();
    let first = store.find("r1", "w1").unwrap().unwrap();

    sleep(Duration::from_millis(5));
    let mut changed = approved("r1", "w1");
    changed.justification = "scope widened".to_string();
    store.upsert(&changed).unwrap();

    let rows = store.query(&ApprovalFilter::all()).unwrap();
    assert_eq!(rows.len(), 1, "one row per (resource_id, workspace_id)");
    assert_eq!(rows[0].justification, "scope widened");
    assert!(rows[0].updated_at > first.updated_at);
}

#[test]
fn revoke_is_single_shot() {
    let store = store();
    store.upsert(&approved("r1", "w1")).unwrap();

    let outcome = store
        .revoke("r1", "w1", "security@example.com", "policy violation")
        .unwrap();
    assert_eq!(outcome, RevokeOutcome::Revoked);

    let row = store.find("r1", "w1").unwrap().unwrap();
    assert!(!row.is_approved);
    assert_eq!(row.revoked_by.as_deref(), Some("security@example.com"));
    assert_eq!(row.revoked_reason.as_deref(), Some("policy violation"));
    assert!(row.revoked_date.is_some());

    let again = store
        .revoke("r1", "w1", "security@example.com", "policy violation")
        .unwrap();
    assert_eq!(again, RevokeOutcome::NotApproved);
    let unknown = store.revoke("nope", "w1", "someone", "reason").unwrap();
    assert_eq!(unknown, RevokeOutcome::NotApproved);
}

#[test]
fn reapproval_clears_revocation() {
    let store = store();
    store.upsert(&approved("r1", "w1")).unwrap();
    store.revoke("r1", "w1", "security", "expired contract").unwrap();

    store.upsert(&approved("r1", "w1")).unwrap();
    let row = store.find("r1", "w1").unwrap().unwrap();
    assert!(row.is_approved);
    assert_eq!(row.revoked_date, None);
    assert_eq!(row.revoked_by, None);
    assert_eq!(row.revoked_reason, None);
}

#[test]
fn revoke_requires_every_field() {
    let store = store();
    let err = store.revoke("r1", "w1", "security", "  ").unwrap_err();
    assert_eq!(
        err,
        GuardianError::Validation(ValidationError::EmptyField {
            field: "revoked_reason"
        })
    );
    let err = store.revoke("", "w1", "security", "reason").unwrap_err();
    assert!(matches!(err, GuardianError::Validation(_)));
}

#[test]
fn expired_approval_is_rejected() {
    let store = store();
    let mut record = approved("r1", "w1");
    record.expiration_date = Some(Utc::now() - chrono::Duration::days(1));

    let err = store.upsert(&record).unwrap_err();
    assert!(matches!(
        err,
        GuardianError::Validation(ValidationError::ExpirationInPast { .. })
    ));
    assert!(store.find("r1", "w1").unwrap().is_none());
}

#[test]
fn blank_resource_name_is_rejected() {
    let store = store();
    let mut record = approved("r1", "w1");
    record.resource_name = "  ".to_string();

    let err = store.upsert(&record).unwrap_err();
    assert_eq!(
        err,
        GuardianError::Validation(ValidationError::EmptyField {
            field: "resource_name"
        })
    );
    assert!(store.query(&ApprovalFilter::all()).unwrap().is_empty());
}

#[test]
fn revoked_record_cannot_be_upserted() {
    let store = store();
    let mut record = approved("r1", "w1");
    record.revoked_by = Some("someone".to_string());
    let err = store.upsert(&record).unwrap_err();
    assert!(matches!(
        err,
        GuardianError::Validation(ValidationError::NotApprovedState { .. })
    ));
}

#[test]
fn filters_and_ordering() {
    let store = store();
    store.upsert(&approved("r2", "w2")).unwrap();
    store.upsert(&approved("r1", "w2")).unwrap();
    store.upsert(&approved("r9", "w1")).unwrap();
    store.revoke("r1", "w2", "security", "unused").unwrap();

    let all = store.query(&ApprovalFilter::all()).unwrap();
    let keys: Vec<(&str, &str)> = all
        .iter()
        .map(|r| (r.workspace_id.as_str(), r.resource_id.as_str()))
        .collect();
    assert_eq!(keys, vec![("w1", "r9"), ("w2", "r1"), ("w2", "r2")]);

    let w2 = store.query(&ApprovalFilter::all().workspace("w2")).unwrap();
    assert_eq!(w2.len(), 2);

    let approved_w2 = store
        .query(&ApprovalFilter::all().workspace("w2").approved_only())
        .unwrap();
    assert_eq!(approved_w2.len(), 1);
    assert_eq!(approved_w2[0].resource_id, "r2");
}

#[test]
fn active_approval_excludes_revoked() {
    let store = store();
    store.upsert(&approved("r1", "w1")).unwrap();
    assert!(store.active_approval("r1", "w1").unwrap().is_some());

    store.revoke("r1", "w1", "security", "done").unwrap();
    assert!(store.active_approval("r1", "w1").unwrap().is_none());
    assert!(store.active_approval("missing", "w1").unwrap().is_none());
}

#[test]
fn describe_columns_lists_every_migrated_column() {
    let store = store();
    let columns = store.describe_columns().unwrap();
    for expected in [
        "resource_id",
        "workspace_id",
        "is_approved",
        "revoked_reason",
        "resource_type",
        "updated_at",
    ] {
        assert!(columns.iter().any(|c| c == expected), "missing {expected}: {columns:?}");
    }
    assert_eq!(columns.len(), 15);
}

#[test]
fn hostile_text_is_stored_verbatim() {
    let store = store();
    let mut record = approved("r1", "w1");
    record.justification = "'); DROP TABLE approved_resources; --".to_string();
    record.resource_name = "name with \"quotes\" and `ticks`".to_string();
    store.upsert(&record).unwrap();

    let row = store.find("r1", "w1").unwrap().unwrap();
    assert_eq!(row.justification, record.justification);
    assert_eq!(row.resource_name, record.resource_name);
    assert_eq!(store.query(&ApprovalFilter::all()).unwrap().len(), 1);
}

#[test]
fn audit_table_name_matches_namespace() {
    let store = store();
    assert_eq!(
        store.table().to_string(),
        "main.workspace_guardian.approved_resources"
    );
}
