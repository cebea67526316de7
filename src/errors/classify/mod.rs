//! Pure helpers over caught errors: message extraction, retryability,
//! best-effort code derivation, system-error translation, log records and
//! response envelopes.
//!
//! The substring heuristics here only apply to errors that were *not*
//! already built as [`AppError`]. Anything typed keeps its own code and flags.

use super::{AppError, Details, ErrorCode, SerializedError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::backtrace::BacktraceStatus;
use std::error::Error;

pub const FALLBACK_USER_MESSAGE: &str = "An unexpected error occurred.";

/// Substrings that mark a message as a transient transport failure.
/// Deliberately broad; everything else is treated as permanent.
const TRANSIENT_PATTERNS: &[&str] = &[
    "network",
    "timeout",
    "timed out",
    "econnrefused",
    "connection refused",
    "connection reset",
    "econnreset",
    "enotfound",
    "failed to lookup address",
    "dns error",
    "failed to fetch",
    "error sending request",
    "broken pipe",
];

/// Render an error and its `source()` chain as `outer: inner: root`.
pub fn error_chain(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

fn or_fallback(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_USER_MESSAGE.to_string()
    } else {
        message
    }
}

/// The message a screen should show for `err`.
pub fn extract_user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AppError>() {
        Some(app) => or_fallback(app.user_message().to_string()),
        None => or_fallback(err.to_string()),
    }
}

/// The message a log line should carry for `err`.
pub fn extract_technical_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AppError>() {
        Some(app) => or_fallback(app.message().to_string()),
        None => or_fallback(format!("{:#}", err)),
    }
}

pub fn message_is_transient(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_PATTERNS.iter().any(|p| lower.contains(p))
}

pub fn is_retryable(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<AppError>() {
        Some(app) => app.is_retryable(),
        None => message_is_transient(&format!("{:#}", err)),
    }
}

/// Guess a code from message text. Returns [`ErrorCode::Unknown`] when
/// nothing matches.
pub fn derive_code_from_message(message: &str) -> ErrorCode {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["timeout", "timed out", "etimedout"]) {
        ErrorCode::NetworkTimeout
    } else if has(&["offline"]) {
        ErrorCode::NetworkOffline
    } else if has(&[
        "econnrefused",
        "connection refused",
        "enotfound",
        "failed to lookup address",
        "failed to fetch",
        "network",
    ]) {
        ErrorCode::NetworkUnreachable
    } else if has(&["forbidden"]) {
        ErrorCode::AuthForbidden
    } else if has(&["unauthorized", "unauthenticated", "not authenticated"]) {
        ErrorCode::AuthUnauthorized
    } else if has(&["no such container"]) {
        ErrorCode::DockerContainerNotFound
    } else if has(&["no such image", "image not found"]) {
        ErrorCode::DockerImageNotFound
    } else if has(&["docker", "container"]) {
        ErrorCode::DockerNotRunning
    } else if has(&["command not found"]) {
        ErrorCode::CliNotFound
    } else if has(&["cli ", "exit code", "exit status"]) {
        ErrorCode::CliExecutionFailed
    } else if has(&["database", "postgres", "sql"]) {
        if has(&["connect"]) {
            ErrorCode::DbConnectionFailed
        } else {
            ErrorCode::DbQueryError
        }
    } else if has(&["enoent", "no such file"]) {
        ErrorCode::FsNotFound
    } else if has(&["eacces", "eperm", "permission denied"]) {
        ErrorCode::FsPermissionDenied
    } else if has(&["enospc", "no space left"]) {
        ErrorCode::FsDiskFull
    } else {
        ErrorCode::Unknown
    }
}

/// Best-effort code for `err`. Typed errors report their own code.
pub fn derive_code(err: &anyhow::Error) -> ErrorCode {
    match err.downcast_ref::<AppError>() {
        Some(app) => app.known_code().unwrap_or(ErrorCode::Unknown),
        None => derive_code_from_message(&format!("{:#}", err)),
    }
}

/// Map an errno-style identifier to a typed error.
pub fn translate_system_error(errno: &str, message: &str) -> AppError {
    let code = match errno {
        "ENOENT" => ErrorCode::FsNotFound,
        "EACCES" | "EPERM" => ErrorCode::FsPermissionDenied,
        "EEXIST" => ErrorCode::FsAlreadyExists,
        "ENOSPC" => ErrorCode::FsDiskFull,
        "ECONNREFUSED" | "ENOTFOUND" => ErrorCode::NetworkUnreachable,
        "ETIMEDOUT" => ErrorCode::NetworkTimeout,
        _ => {
            return AppError::from_unknown(anyhow::anyhow!("{}", message), ErrorCode::Unknown)
                .with_detail("errno", errno);
        }
    };
    AppError::with_message(code, message).with_detail("errno", errno)
}

pub fn translate_io_error(err: &std::io::Error) -> AppError {
    use std::io::ErrorKind;

    let message = err.to_string();
    let errno = match err.kind() {
        ErrorKind::NotFound => "ENOENT",
        ErrorKind::PermissionDenied => "EACCES",
        ErrorKind::AlreadyExists => "EEXIST",
        ErrorKind::StorageFull => "ENOSPC",
        ErrorKind::ConnectionRefused => "ECONNREFUSED",
        ErrorKind::TimedOut => "ETIMEDOUT",
        _ if message.contains("failed to lookup address") => "ENOTFOUND",
        _ => return AppError::from_std(err, ErrorCode::Unknown),
    };
    translate_system_error(errno, &message)
}

/// Structured diagnostic record for log sinks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl LogRecord {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl From<&AppError> for LogRecord {
    fn from(err: &AppError) -> Self {
        Self {
            name: "AppError",
            code: Some(err.code()),
            message: err.message().to_string(),
            user_message: Some(err.user_message().to_string()),
            action: err.action().map(str::to_string),
            retryable: Some(err.is_retryable()),
            status_code: Some(err.status_code()),
            details: err.details().cloned(),
            stack: err.stack().map(str::to_string),
        }
    }
}

pub fn format_for_logging(err: &anyhow::Error) -> LogRecord {
    if let Some(app) = err.downcast_ref::<AppError>() {
        return LogRecord::from(app);
    }
    let bt = err.backtrace();
    LogRecord {
        name: "Error",
        code: None,
        message: or_fallback(format!("{:#}", err)),
        user_message: None,
        action: None,
        retryable: None,
        status_code: None,
        details: None,
        stack: (bt.status() == BacktraceStatus::Captured).then(|| bt.to_string()),
    }
}

/// `{ success: false, error: {...} }` as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub error: SerializedError,
}

/// Envelope for a typed error.
///
/// `include_stack` folds the technical message and backtrace into
/// `details.stack`. Only set it for trusted, internal consumers; without it
/// every `stack` key is stripped from `details`, however deeply nested.
pub fn envelope_for(err: &AppError, include_stack: bool) -> ResponseEnvelope {
    let mut error = err.serialize();
    if let Some(details) = error.details.as_mut() {
        strip_stack_keys(details);
    }
    if include_stack {
        let mut trace = err.message().to_string();
        if let Some(stack) = err.stack() {
            trace.push('\n');
            trace.push_str(stack);
        }
        error
            .details
            .get_or_insert_with(Map::new)
            .insert("stack".to_string(), Value::String(trace));
    }
    ResponseEnvelope {
        success: false,
        error,
    }
}

pub fn build_response_envelope(err: &anyhow::Error, include_stack: bool) -> ResponseEnvelope {
    envelope_for(
        &AppError::from_anyhow_ref(err, ErrorCode::Unknown),
        include_stack,
    )
}

fn strip_stack_keys(map: &mut Details) {
    map.remove("stack");
    for value in map.values_mut() {
        strip_stack_value(value);
    }
}

fn strip_stack_value(value: &mut Value) {
    match value {
        Value::Object(map) => strip_stack_keys(map),
        Value::Array(items) => items.iter_mut().for_each(strip_stack_value),
        _ => {}
    }
}

#[derive(Deserialize)]
struct WireEnvelope {
    error: WireError,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireError {
    code: u32,
    message: String,
    #[serde(default)]
    user_message: Option<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    retryable: Option<bool>,
    #[serde(default)]
    details: Option<Details>,
}

/// Rebuild a typed error from a server failure body.
///
/// Accepts only `{ "error": { "code": <int>, "message": <string>, ... } }`.
/// Optional fields override the local descriptor; anything else is `None`
/// so the caller can fall back to the HTTP status.
pub fn parse_error_envelope(body: &str, status: u16) -> Option<AppError> {
    let wire: WireEnvelope = serde_json::from_str(body).ok()?;
    let WireError {
        code,
        message,
        user_message,
        action,
        retryable,
        details,
    } = wire.error;

    let mut app = AppError::from_parts(code, Some(message), details, Some(status));
    if let Some(user_message) = user_message.filter(|m| !m.trim().is_empty()) {
        app = app.with_user_message(user_message);
    }
    if action.is_some() {
        app = app.with_action(action);
    }
    if let Some(retryable) = retryable {
        app = app.with_retryable(retryable);
    }
    Some(app)
}
