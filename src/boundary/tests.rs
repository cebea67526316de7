use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct CountingReloader(AtomicUsize);

impl Reloader for CountingReloader {
    fn reload(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn expect_fallback<T: std::fmt::Debug>(rendered: Rendered<T>) -> Fallback {
    match rendered {
        Rendered::Fallback(fallback) => fallback,
        Rendered::View(view) => panic!("expected fallback, got view {view:?}"),
    }
}

#[test]
fn test_successful_render_passes_through() {
    let mut boundary = ErrorBoundary::new(|| Ok("dashboard"), Environment::Production);
    assert_eq!(boundary.render(), Rendered::View("dashboard"));
    assert!(!boundary.has_error());
}

#[test]
fn test_typed_error_shows_user_message() {
    let mut boundary = ErrorBoundary::new(
        || -> anyhow::Result<()> { Err(AppError::new(ErrorCode::DockerNotRunning).into()) },
        Environment::Production,
    );
    let fallback = expect_fallback(boundary.render());
    assert_eq!(fallback.code, ErrorCode::DockerNotRunning.as_u32());
    assert_eq!(fallback.user_message, "The container runtime is not running.");
    assert_eq!(fallback.action.as_deref(), Some("Start Docker and try again."));
    assert_eq!(
        fallback.actions,
        vec![BoundaryAction::TryAgain, BoundaryAction::Reload]
    );
    assert!(fallback.diagnostics.is_none());
}

#[test]
fn test_diagnostics_only_outside_production() {
    let mut boundary = ErrorBoundary::new(
        || -> anyhow::Result<()> {
            Err(AppError::with_message(ErrorCode::DbQueryError, "relation \"users\" missing").into())
        },
        Environment::Development,
    );
    let fallback = expect_fallback(boundary.render());
    let diagnostics = fallback.diagnostics.clone().unwrap();
    assert_eq!(diagnostics.message, "relation \"users\" missing");
    assert!(fallback.to_string().contains("relation \"users\" missing"));
}

#[test]
fn test_production_display_hides_technical_message() {
    let mut boundary = ErrorBoundary::new(
        || -> anyhow::Result<()> {
            Err(AppError::with_message(ErrorCode::DbQueryError, "relation \"users\" missing").into())
        },
        Environment::Production,
    );
    let text = expect_fallback(boundary.render()).to_string();
    assert!(!text.contains("relation"));
    assert!(text.contains("[Try again] [Reload]"));
}

#[test]
fn test_panic_is_caught() {
    let mut boundary = ErrorBoundary::new(
        || -> anyhow::Result<u32> { panic!("widget exploded") },
        Environment::Development,
    );
    let fallback = expect_fallback(boundary.render());
    assert_eq!(fallback.code, ErrorCode::Unknown.as_u32());
    assert_eq!(fallback.user_message, "An unexpected error occurred.");
    assert_eq!(fallback.diagnostics.unwrap().message, "widget exploded");
}

#[test]
fn test_caught_state_sticks_until_reset() {
    let mut calls = 0;
    let mut boundary = ErrorBoundary::new(
        move || {
            calls += 1;
            if calls == 1 {
                anyhow::bail!("first render fails");
            }
            Ok(calls)
        },
        Environment::Production,
    );

    assert!(boundary.render().is_fallback());
    // Still the fallback: the render function is not re-run.
    assert!(boundary.render().is_fallback());
    assert!(boundary.has_error());

    assert_eq!(boundary.reset(), Rendered::View(2));
    assert!(!boundary.has_error());
}

#[test]
fn test_untyped_error_uses_its_message() {
    let mut boundary = ErrorBoundary::new(
        || -> anyhow::Result<()> { anyhow::bail!("list is empty") },
        Environment::Production,
    );
    let fallback = expect_fallback(boundary.render());
    assert_eq!(fallback.code, ErrorCode::Unknown.as_u32());
    assert_eq!(fallback.user_message, "list is empty");
}

#[test]
fn test_reload_clears_state_and_calls_host() {
    let reloader = Arc::new(CountingReloader::default());
    let mut boundary = ErrorBoundary::new(
        || -> anyhow::Result<()> { anyhow::bail!("boom") },
        Environment::Production,
    )
    .with_reloader(reloader.clone());

    assert!(boundary.render().is_fallback());
    assert!(boundary.handle(BoundaryAction::Reload).is_none());
    assert!(!boundary.has_error());
    assert_eq!(reloader.0.load(Ordering::SeqCst), 1);

    let again = boundary.handle(BoundaryAction::TryAgain).unwrap();
    assert!(again.is_fallback());
}

#[test]
fn test_fallback_serializes_camel_case() {
    let mut boundary = ErrorBoundary::new(
        || -> anyhow::Result<()> { Err(AppError::unauthorized().into()) },
        Environment::Production,
    );
    let fallback = expect_fallback(boundary.render());
    let value = serde_json::to_value(&fallback).unwrap();
    assert!(value.get("userMessage").is_some());
    assert_eq!(value["actions"], serde_json::json!(["tryAgain", "reload"]));
    assert!(value.get("diagnostics").is_none());
}
