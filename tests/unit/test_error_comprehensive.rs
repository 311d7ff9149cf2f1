use flowport::core::error::{AppError, DefaultErrorReporter, ErrorReporter};
use flowport::core::store::StoreError;
use flowport::core::translator::map_type;
use flowport::core::types::{ErrorCategory, ErrorSeverity};

#[test]
fn test_error_creation_all_categories() {
    let categories = vec![
        ErrorCategory::ValidationError,
        ErrorCategory::TranslationError,
        ErrorCategory::ConfigurationError,
        ErrorCategory::StoreError,
        ErrorCategory::SerializationError,
        ErrorCategory::IoError,
        ErrorCategory::InternalError,
        ErrorCategory::Unknown,
    ];

    for category in categories {
        let error = AppError::new(category, "test message");
        assert_eq!(error.category, category);
        assert_eq!(error.message, "test message");
        assert!(error.code.starts_with("ERR-"));
        assert!(error.context.is_empty());
        assert!(error.recovery_suggestions.is_empty());
        assert!(error.occurred_at <= chrono::Utc::now());
        assert!(error.source.is_none());
    }
}

#[test]
fn test_error_severity_mapping() {
    let test_cases = vec![
        (ErrorCategory::ValidationError, ErrorSeverity::Error),
        (ErrorCategory::TranslationError, ErrorSeverity::Error),
        (ErrorCategory::ConfigurationError, ErrorSeverity::Error),
        (ErrorCategory::StoreError, ErrorSeverity::Error),
        (ErrorCategory::SerializationError, ErrorSeverity::Error),
        (ErrorCategory::IoError, ErrorSeverity::Error),
        (ErrorCategory::InternalError, ErrorSeverity::Error),
        (ErrorCategory::Unknown, ErrorSeverity::Info),
    ];

    for (category, expected_severity) in test_cases {
        assert_eq!(AppError::new(category, "test").severity(), expected_severity);
    }
}

#[test]
fn test_error_add_context() {
    let mut error = AppError::new(ErrorCategory::TranslationError, "copy failed");
    error.add_context("pipeline", "daily_load");
    error.add_context("activity", "CopyOrders");

    assert_eq!(error.context.len(), 2);
    assert_eq!(error.context.get("pipeline"), Some(&"daily_load".to_string()));
    assert_eq!(error.context.get("activity"), Some(&"CopyOrders".to_string()));
}

#[test]
fn test_error_builder_chain() {
    let error = AppError::new(ErrorCategory::ConfigurationError, "bad scope")
        .with_code("FP-CONFIG-001")
        .with_context("flowport.toml")
        .with_suggestion("Set translation.secret_scope")
        .with_suggestion("Or export FLOWPORT_SECRET_SCOPE");

    assert_eq!(error.code, "FP-CONFIG-001");
    assert_eq!(error.context.get("context"), Some(&"flowport.toml".to_string()));
    assert_eq!(error.recovery_suggestions.len(), 2);
}

#[test]
fn test_error_display_format() {
    let error = AppError::new(ErrorCategory::TranslationError, "unknown type").with_code("FP-TYPE-001");
    assert_eq!(error.to_string(), "[FP-TYPE-001] TranslationError: unknown type");

    let with_context = error.with_context("column id");
    let rendered = with_context.to_string();
    assert!(rendered.starts_with("[FP-TYPE-001] TranslationError: unknown type"));
    assert!(rendered.contains("column id"));
}

#[test]
fn test_error_with_source() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
    let error = AppError::with_source(ErrorCategory::IoError, "cannot read", Box::new(io));

    assert!(error.source.is_some());
    assert!(error.to_string().contains("Caused by: missing.json"));
}

#[test]
fn test_from_conversions() {
    let io: AppError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
    assert_eq!(io.category, ErrorCategory::IoError);
    assert_eq!(io.code, "FP-IO-001");

    let json_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let json: AppError = json_error.into();
    assert_eq!(json.category, ErrorCategory::SerializationError);
    assert_eq!(json.code, "FP-SERDE-001");

    let anyhow_error: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(anyhow_error.category, ErrorCategory::InternalError);
    assert_eq!(anyhow_error.message, "boom");
}

#[test]
fn test_store_errors_carry_stable_codes() {
    let cases = vec![
        (
            StoreError::NotFound {
                kind: "pipeline",
                name: "missing".to_string(),
            },
            "FP-STORE-001",
            ErrorCategory::StoreError,
        ),
        (
            StoreError::NotSupported("read only".to_string()),
            "FP-STORE-002",
            ErrorCategory::StoreError,
        ),
        (
            StoreError::Configuration("no path".to_string()),
            "FP-STORE-003",
            ErrorCategory::StoreError,
        ),
        (
            StoreError::Io {
                path: "out/job.json".into(),
                message: "disk full".to_string(),
            },
            "FP-STORE-004",
            ErrorCategory::IoError,
        ),
        (
            StoreError::Parse {
                path: "pipeline/x.json".into(),
                message: "expected value".to_string(),
            },
            "FP-STORE-005",
            ErrorCategory::SerializationError,
        ),
    ];

    for (store_error, code, category) in cases {
        let message = store_error.to_string();
        let error = AppError::from(store_error);
        assert_eq!(error.code, code);
        assert_eq!(error.category, category);
        assert_eq!(error.message, message);
        assert_eq!(error.recovery_suggestions.len(), 1);
    }
}

#[test]
fn test_type_mapping_errors_are_hard_failures() {
    let unknown_system = map_type("Int32", "oracle").unwrap_err();
    assert_eq!(unknown_system.code, "FP-TYPE-002");

    let unknown_type = map_type("Geography", "sqlserver").unwrap_err();
    assert_eq!(unknown_type.code, "FP-TYPE-001");
    assert_eq!(unknown_type.category, ErrorCategory::TranslationError);
}

#[test]
fn test_reporter_does_not_panic() {
    let reporter = DefaultErrorReporter::new();
    let mut error = AppError::new(ErrorCategory::StoreError, "pipeline 'x' not found")
        .with_code("FP-STORE-001")
        .with_suggestion("Check the name");
    error.add_context("dir", "/tmp/adf");

    reporter.report_error(&error);
    reporter.report_warning("placeholder task", Some("NotifyTeam".to_string()));
    reporter.report_info("done");
}
