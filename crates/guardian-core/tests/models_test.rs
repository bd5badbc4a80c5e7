use chrono::{Duration, TimeZone, Utc};
use guardian_core::errors::{ErrorKind, ValidationError};
use guardian_core::models::*;

fn request() -> ApprovalRequest {
    ApprovalRequest {
        resource_id: "cluster-0412".into(),
        workspace_id: "ws-1".into(),
        resource_name: "etl-nightly".into(),
        resource_type: Some("cluster".into()),
        workspace_name: "analytics".into(),
        resource_creator: "alice@example.com".into(),
        approved_by: "bob@example.com".into(),
        expiration_date: None,
        justification: "nightly ETL".into(),
    }
}

// ---- TableName ----

#[test]
fn parses_three_part_identifier() {
    let t = TableName::parse("ops.guardian.approved_resources", "main").unwrap();
    assert_eq!(t.catalog, "ops");
    assert_eq!(t.schema, "guardian");
    assert_eq!(t.table, "approved_resources");
    assert_eq!(t.to_string(), "ops.guardian.approved_resources");
    assert_eq!(t.schema_path(), "ops.guardian");
}

#[test]
fn two_part_identifier_takes_default_catalog() {
    let t = TableName::parse("workspace_guardian.approved_resources", "main").unwrap();
    assert_eq!(t.catalog, "main");
}

#[test]
fn rejects_bad_identifiers() {
    for bad in [
        "",
        "table_only",
        "a.b.c.d",
        "a..c",
        "main.sch ema.t",
        "main.s.t`; DROP TABLE x",
        "main.s.\"t\"",
    ] {
        assert!(TableName::parse(bad, "main").is_err(), "accepted {bad:?}");
    }
    assert!(TableName::parse("s.t", "bad catalog").is_err());
}

#[test]
fn sibling_stays_in_schema() {
    let t = TableName::parse("main.wg.approved_resources", "main").unwrap();
    let ledger = t.sibling("migration_definitions").unwrap();
    assert_eq!(ledger.to_string(), "main.wg.migration_definitions");
    assert!(t.sibling("x.y").is_err());
}

// ---- ApprovalRecord ----

#[test]
fn approve_sets_audit_fields() {
    let now = Utc::now();
    let record = ApprovalRecord::approve(request(), now).unwrap();
    assert!(record.is_approved);
    assert_eq!(record.approval_date, now);
    assert_eq!(record.updated_at, now);
    assert!(record.revoked_date.is_none());
    assert!(record.is_active_at(now));
}

#[test]
fn approve_rejects_empty_justification() {
    let mut req = request();
    req.justification = "   ".into();
    let err = ApprovalRecord::approve(req, Utc::now()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::EmptyField {
            field: "justification"
        }
    );
}

#[test]
fn approve_rejects_empty_resource_name() {
    let mut req = request();
    req.resource_name = String::new();
    let err = ApprovalRecord::approve(req, Utc::now()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::EmptyField {
            field: "resource_name"
        }
    );
}

#[test]
fn approve_rejects_past_expiration() {
    let now = Utc::now();
    let mut req = request();
    req.expiration_date = Some(now - Duration::days(1));
    assert!(matches!(
        ApprovalRecord::approve(req, now).unwrap_err(),
        ValidationError::ExpirationInPast { .. }
    ));
}

#[test]
fn upsert_validation_rejects_revoked_state() {
    let now = Utc::now();
    let mut record = ApprovalRecord::approve(request(), now).unwrap();
    record.revoked_reason = Some("stale".into());
    assert!(matches!(
        record.validate_for_upsert(now).unwrap_err(),
        ValidationError::NotApprovedState { .. }
    ));
    record.revoked_reason = None;
    record.is_approved = false;
    assert!(record.validate_for_upsert(now).is_err());
}

#[test]
fn expired_record_is_not_active() {
    let now = Utc::now();
    let mut req = request();
    req.expiration_date = Some(now + Duration::hours(1));
    let record = ApprovalRecord::approve(req, now).unwrap();
    assert!(record.is_active_at(now));
    assert!(!record.is_active_at(now + Duration::hours(2)));
}

#[test]
fn filter_builder() {
    let f = ApprovalFilter::all().workspace("ws-1").approved_only();
    assert_eq!(f.workspace_id.as_deref(), Some("ws-1"));
    assert!(f.resource_id.is_none());
    assert!(f.approved_only);
}

// ---- QueryOutput / RowRef ----

#[test]
fn row_access_is_case_insensitive_and_tolerates_missing_columns() {
    let out = QueryOutput {
        columns: vec!["RESOURCE_ID".into(), "is_approved".into(), "updated_at".into()],
        rows: vec![vec![
            SqlValue::Text("r1".into()),
            SqlValue::Text("true".into()),
            SqlValue::Text("2024-03-01 10:15:30.123456".into()),
        ]],
        affected_rows: 0,
    };
    let row = out.first().unwrap();
    assert_eq!(row.text("resource_id").unwrap(), "r1");
    assert!(row.bool("is_approved").unwrap());
    assert_eq!(
        row.timestamp("updated_at").unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap() + Duration::microseconds(123_456)
    );
    assert_eq!(row.opt_text("revoked_reason").unwrap(), None);
    assert_eq!(
        row.text("revoked_reason").unwrap_err().kind(),
        ErrorKind::SyntaxOrSchemaError
    );
}

#[test]
fn row_type_mismatch_is_schema_error() {
    let out = QueryOutput {
        columns: vec!["version".into()],
        rows: vec![vec![SqlValue::Text("two".into())]],
        affected_rows: 0,
    };
    let err = out.first().unwrap().int("version").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SyntaxOrSchemaError);
}

#[test]
fn booleans_decode_from_integers() {
    let out = QueryOutput {
        columns: vec!["success".into()],
        rows: vec![vec![SqlValue::Int(1)], vec![SqlValue::Int(0)]],
        affected_rows: 0,
    };
    let values: Vec<bool> = out.iter().map(|r| r.bool("success").unwrap()).collect();
    assert_eq!(values, vec![true, false]);
}

#[test]
fn timestamps_format_with_microseconds() {
    let ts = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap() + Duration::microseconds(7);
    let formatted = format_timestamp(&ts);
    assert_eq!(formatted, "2025-01-02T03:04:05.000007Z");
    assert_eq!(parse_timestamp(&formatted), Some(ts));
    assert_eq!(parse_timestamp("not a date"), None);
}

#[test]
fn statement_binds_named_params() {
    let stmt = Statement::new("SELECT 1 WHERE a = :a")
        .bind("a", "x")
        .bind("b", 3u32)
        .bind("c", true);
    assert_eq!(stmt.params.len(), 3);
    assert_eq!(stmt.params[1], ("b".to_string(), SqlValue::Int(3)));
}

// ---- MigrationStatus ----

#[test]
fn status_reports_failed_versions_without_success() {
    let at = Utc::now();
    let rec = |version, success| MigrationRecord {
        version,
        description: format!("v{version}"),
        applied_at: at,
        success,
    };
    let status = MigrationStatus {
        records: vec![rec(1, true), rec(2, false), rec(2, true), rec(3, false), rec(3, false)],
        pending: vec![3],
        highest_defined: 3,
    };
    assert_eq!(status.failed_versions(), vec![3]);
    assert!(!status.is_current());
}
