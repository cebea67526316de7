use super::*;
use proptest::prelude::*;

#[test]
fn new_uses_descriptor_copy_for_both_messages() {
    let err = AppError::new(ErrorCode::DockerNotRunning);
    assert_eq!(err.code(), 4001);
    assert_eq!(err.message(), "The container runtime is not running.");
    assert_eq!(err.user_message(), err.message());
    assert_eq!(err.action(), Some("Start Docker and try again."));
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), 503);
    assert!(err.details().is_none());
}

#[test]
fn from_parts_keeps_technical_message_separate() {
    let err = AppError::from_parts(
        ErrorCode::DbQueryError.as_u32(),
        Some("relation \"users\" does not exist".into()),
        None,
        None,
    );
    assert_eq!(err.message(), "relation \"users\" does not exist");
    assert_eq!(err.user_message(), "The database query failed.");
    assert_eq!(err.to_string(), "relation \"users\" does not exist");
}

#[test]
fn from_parts_explicit_status_wins() {
    let err = AppError::from_parts(ErrorCode::Internal.as_u32(), None, None, Some(502));
    assert_eq!(err.status_code(), 502);
}

#[test]
fn from_parts_unknown_code_uses_fallback_copy() {
    let err = AppError::from_parts(31_337, None, None, None);
    assert_eq!(err.user_message(), "An unexpected error occurred.");
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), 500);
    assert!(err.known_code().is_none());
    assert!(err.band().is_none());
}

#[test]
fn named_constructors() {
    let net = AppError::network();
    assert_eq!(net.known_code(), Some(ErrorCode::NetworkUnreachable));
    assert!(net.is_retryable());

    let timeout = AppError::timeout();
    assert_eq!(timeout.known_code(), Some(ErrorCode::NetworkTimeout));
    assert_eq!(timeout.status_code(), 408);
    assert!(timeout.is_retryable());

    let unauth = AppError::unauthorized();
    assert!(unauth.is_auth_error());
    assert_eq!(unauth.status_code(), 401);
    assert!(!unauth.is_retryable());

    let mut details = Details::new();
    details.insert("field".into(), "port".into());
    let invalid = AppError::validation("port must be numeric", Some(details));
    assert!(invalid.is_validation_error());
    assert_eq!(invalid.status_code(), 400);
    assert!(invalid.message().contains("port must be numeric"));
    assert_eq!(invalid.details().unwrap()["field"], "port");

    let missing = AppError::not_found("Service 'redis'");
    assert_eq!(missing.message(), "Service 'redis' not found");
    assert_eq!(missing.status_code(), 404);

    let cancelled = AppError::cancelled();
    assert_eq!(cancelled.known_code(), Some(ErrorCode::Cancelled));
    assert!(!cancelled.is_retryable());
}

#[test]
fn from_unknown_returns_typed_error_unchanged() {
    let original = AppError::not_found("Backup 'nightly'").with_detail("id", 7);
    let wrapped: anyhow::Error = original.into();
    let back = AppError::from_unknown(wrapped, ErrorCode::Internal);
    assert_eq!(back.known_code(), Some(ErrorCode::NotFound));
    assert_eq!(back.message(), "Backup 'nightly' not found");
    assert_eq!(back.details().unwrap()["id"], 7);
}

#[test]
fn from_unknown_wraps_plain_errors_under_default_code() {
    let err = anyhow::anyhow!("disk exploded");
    let app = AppError::from_unknown(err, ErrorCode::ProjectBuildFailed);
    assert_eq!(app.known_code(), Some(ErrorCode::ProjectBuildFailed));
    assert_eq!(app.message(), "disk exploded");
    assert_eq!(app.user_message(), "The project build failed.");
}

#[test]
fn from_unknown_keeps_context_chain() {
    let err = anyhow::anyhow!("root cause").context("while building");
    let app = AppError::from_unknown(err, ErrorCode::Unknown);
    assert_eq!(app.message(), "while building: root cause");
}

#[test]
fn from_unknown_empty_message() {
    let app = AppError::from_unknown(anyhow::anyhow!(""), ErrorCode::Unknown);
    assert_eq!(app.message(), "Unknown error");
}

#[test]
fn from_std_with_io_error() {
    let io = std::io::Error::other("pipe closed");
    let app = AppError::from_std(&io, ErrorCode::CliExecutionFailed);
    assert_eq!(app.known_code(), Some(ErrorCode::CliExecutionFailed));
    assert_eq!(app.message(), "pipe closed");
}

#[test]
fn from_panic_payloads() {
    let s: Box<dyn std::any::Any + Send> = Box::new("boom");
    assert_eq!(AppError::from_panic(s.as_ref(), ErrorCode::Internal).message(), "boom");

    let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("owned boom"));
    assert_eq!(
        AppError::from_panic(owned.as_ref(), ErrorCode::Internal).message(),
        "owned boom"
    );

    let typed: Box<dyn std::any::Any + Send> = Box::new(AppError::unauthorized());
    assert!(AppError::from_panic(typed.as_ref(), ErrorCode::Internal).is_auth_error());

    let other: Box<dyn std::any::Any + Send> = Box::new(42_u8);
    let app = AppError::from_panic(other.as_ref(), ErrorCode::Internal);
    assert_eq!(app.known_code(), Some(ErrorCode::Internal));
    assert!(app.message().contains("non-string"));
}

#[test]
fn serialize_is_idempotent() {
    let err = AppError::validation("bad", None).with_detail("field", "name");
    assert_eq!(err.serialize(), err.serialize());
    let a = serde_json::to_value(err.serialize()).unwrap();
    let b = serde_json::to_value(err.serialize()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn serialize_shape() {
    let err = AppError::new(ErrorCode::ServiceAlreadyRunning);
    let v = serde_json::to_value(err.serialize()).unwrap();
    assert_eq!(v["code"], 8007);
    assert_eq!(v["userMessage"], "The service is already running.");
    assert_eq!(v["retryable"], false);
    assert!(v.get("action").is_none());
    assert!(v.get("details").is_none());
    assert!(v.get("stack").is_none());
}

#[test]
fn io_error_conversion_translates_kind() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.json missing");
    let app: AppError = io.into();
    assert_eq!(app.known_code(), Some(ErrorCode::FsNotFound));
    assert_eq!(app.details().unwrap()["errno"], "ENOENT");
}

#[test]
fn builder_overrides() {
    let err = AppError::new(ErrorCode::Internal)
        .with_user_message("Custom copy.")
        .with_action(None)
        .with_retryable(false)
        .with_status_code(502);
    assert_eq!(err.user_message(), "Custom copy.");
    assert!(err.action().is_none());
    assert!(!err.is_retryable());
    assert_eq!(err.status_code(), 502);
}

proptest! {
    #[test]
    fn from_unknown_is_total(message in ".*", code_idx in 0usize..ErrorCode::ALL.len()) {
        let default_code = ErrorCode::ALL[code_idx];
        let app = AppError::from_unknown(anyhow::anyhow!("{}", message), default_code);
        prop_assert_eq!(app.code(), default_code.as_u32());
        prop_assert!(!app.message().is_empty());
        prop_assert!(!app.user_message().is_empty());
    }

    #[test]
    fn derived_status_matches_band_rules(code in 0u32..120_000) {
        let err = AppError::from_parts(code, None, None, None);
        prop_assert_eq!(err.status_code(), status_for(code));
        if ErrorBand::Validation.includes(code) {
            prop_assert_eq!(err.status_code(), 400);
        }
        if ErrorBand::Auth.includes(code) {
            prop_assert!(matches!(err.status_code(), 401 | 403 | 429));
        }
    }
}
