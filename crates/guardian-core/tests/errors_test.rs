use guardian_core::errors::*;

#[test]
fn executor_error_round_trips_kind() {
    for kind in [
        ErrorKind::PermissionDenied,
        ErrorKind::NotFound,
        ErrorKind::Timeout,
        ErrorKind::Conflict,
        ErrorKind::SyntaxOrSchemaError,
        ErrorKind::Unknown,
    ] {
        let err = ExecutorError::new(kind, "boom");
        assert_eq!(err.kind(), kind);
        assert_eq!(err.message(), "boom");
    }
}

#[test]
fn only_conflict_and_timeout_are_retryable() {
    assert!(ExecutorError::new(ErrorKind::Conflict, "x").is_retryable());
    assert!(ExecutorError::new(ErrorKind::Timeout, "x").is_retryable());
    assert!(!ExecutorError::new(ErrorKind::PermissionDenied, "x").is_retryable());
    assert!(!ExecutorError::new(ErrorKind::SyntaxOrSchemaError, "x").is_retryable());

    let err: GuardianError = ExecutorError::new(ErrorKind::Timeout, "slow").into();
    assert!(err.is_retryable());
    let err = GuardianError::DeadlineExceeded {
        phase: "ledger".into(),
    };
    assert!(!err.is_retryable());
}

#[test]
fn catalog_missing_names_the_catalog() {
    let err: GuardianError = NamespaceError::CatalogMissing {
        catalog: "finance".into(),
    }
    .into();
    assert!(err.to_string().contains("finance"));
    assert_eq!(err.error_code(), "CATALOG_MISSING");
}

#[test]
fn migration_failed_carries_version_and_source() {
    let err = MigrationError::Failed {
        version: 2,
        description: "add revoked_reason".into(),
        ambiguous: false,
        source: ExecutorError::new(ErrorKind::SyntaxOrSchemaError, "near ALTR"),
    };
    assert_eq!(err.failed_version(), Some(2));
    let msg = err.to_string();
    assert!(msg.contains("version 2"));
    assert!(msg.contains("near ALTR"));

    let top: GuardianError = err.into();
    assert_eq!(top.error_code(), "MIGRATION_FAILED");
    assert_eq!(top.executor_kind(), Some(ErrorKind::SyntaxOrSchemaError));
}

#[test]
fn error_codes_are_stable() {
    let cases: Vec<(GuardianError, &str)> = vec![
        (
            ConfigError::InvalidIdentifier {
                identifier: "x".into(),
                reason: "y".into(),
            }
            .into(),
            "CONFIG_ERROR",
        ),
        (
            NamespaceError::PermissionDenied {
                object: "main.s".into(),
                message: "no".into(),
            }
            .into(),
            "PERMISSION_DENIED",
        ),
        (
            MigrationError::InvalidSet {
                reason: "gap".into(),
            }
            .into(),
            "INVALID_MIGRATION_SET",
        ),
        (
            ValidationError::EmptyField {
                field: "justification",
            }
            .into(),
            "VALIDATION_ERROR",
        ),
        (ExecutorError::new(ErrorKind::Unknown, "?").into(), "STORAGE_ERROR"),
        (
            GuardianError::DeadlineExceeded {
                phase: "migration 1".into(),
            },
            "DEADLINE_EXCEEDED",
        ),
    ];
    for (err, code) in cases {
        assert_eq!(err.error_code(), code, "{err}");
    }
}

#[test]
fn coded_string_prefixes_code() {
    let err = ValidationError::EmptyField { field: "resource_id" };
    assert_eq!(
        err.coded_string(),
        "[VALIDATION_ERROR] field 'resource_id' must not be empty"
    );
}
