pub mod classify;
pub mod codes;
pub mod messages;

pub use codes::{ErrorBand, ErrorCode, status_for};
pub use messages::{ErrorDescriptor, lookup};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as _;
use thiserror::Error;

/// Structured, serializable context attached to an error.
pub type Details = Map<String, Value>;

/// The one error type every console call fails with.
///
/// Built at the point a failure is classified and never re-classified after
/// that. `Display` renders the technical message; screens should show
/// [`AppError::user_message`] instead. Callers branch on [`AppError::code`]
/// and [`AppError::is_retryable`], not on where the error came from.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    code: u32,
    message: String,
    user_message: String,
    action: Option<String>,
    retryable: bool,
    details: Option<Details>,
    status_code: u16,
    stack: Option<String>,
}

/// Convenience alias for results using AppError.
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Wire form of an [`AppError`]. Never carries a stack unless the envelope
/// builder was asked to fold one into `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedError {
    pub code: u32,
    pub message: String,
    pub user_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub retryable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

fn capture_stack() -> Option<String> {
    let bt = Backtrace::capture();
    match bt.status() {
        BacktraceStatus::Captured => Some(bt.to_string()),
        _ => None,
    }
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self::from_parts(code.as_u32(), None, None, None)
    }

    /// Build from a raw code. Without a `message` the descriptor copy is used
    /// as both technical and user message; without a `status_code` the status
    /// is derived from the code.
    pub fn from_parts(
        code: u32,
        message: Option<String>,
        details: Option<Details>,
        status_code: Option<u16>,
    ) -> Self {
        let descriptor = lookup(code);
        Self {
            code,
            message: message.unwrap_or_else(|| descriptor.user_message.to_string()),
            user_message: descriptor.user_message.to_string(),
            action: descriptor.action.map(str::to_string),
            retryable: descriptor.retryable,
            details,
            status_code: status_code.unwrap_or_else(|| status_for(code)),
            stack: capture_stack(),
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::from_parts(code.as_u32(), Some(message.into()), None, None)
    }

    pub fn network() -> Self {
        Self::with_message(ErrorCode::NetworkUnreachable, "Network request failed")
    }

    pub fn timeout() -> Self {
        Self::with_message(ErrorCode::NetworkTimeout, "Request timed out")
    }

    pub fn unauthorized() -> Self {
        Self::with_message(ErrorCode::AuthUnauthorized, "Unauthorized")
    }

    pub fn validation(message: impl AsRef<str>, details: Option<Details>) -> Self {
        Self::from_parts(
            ErrorCode::ValidationInvalidInput.as_u32(),
            Some(format!("Validation failed: {}", message.as_ref())),
            details,
            None,
        )
    }

    pub fn not_found(resource: impl AsRef<str>) -> Self {
        Self::with_message(
            ErrorCode::NotFound,
            format!("{} not found", resource.as_ref()),
        )
    }

    pub fn cancelled() -> Self {
        Self::with_message(ErrorCode::Cancelled, "Request cancelled by caller")
    }

    /// Normalize anything that reached a catch site.
    ///
    /// An `AppError` travelling inside the `anyhow::Error` comes back
    /// unchanged; anything else is wrapped with its rendered message under
    /// `default_code`.
    pub fn from_unknown(err: anyhow::Error, default_code: ErrorCode) -> Self {
        match err.downcast::<AppError>() {
            Ok(app) => app,
            Err(err) => Self::wrap_message(format!("{:#}", err), default_code),
        }
    }

    /// Borrowing form of [`AppError::from_unknown`].
    pub fn from_anyhow_ref(err: &anyhow::Error, default_code: ErrorCode) -> Self {
        match err.downcast_ref::<AppError>() {
            Some(app) => app.clone(),
            None => Self::wrap_message(format!("{:#}", err), default_code),
        }
    }

    pub fn from_std(err: &(dyn std::error::Error + 'static), default_code: ErrorCode) -> Self {
        match err.downcast_ref::<AppError>() {
            Some(app) => app.clone(),
            None => Self::wrap_message(classify::error_chain(err), default_code),
        }
    }

    /// Normalize a panic payload caught by `catch_unwind`.
    pub fn from_panic(payload: &(dyn Any + Send), default_code: ErrorCode) -> Self {
        if let Some(app) = payload.downcast_ref::<AppError>() {
            return app.clone();
        }
        if let Some(err) = payload.downcast_ref::<anyhow::Error>() {
            return Self::from_anyhow_ref(err, default_code);
        }
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with non-string payload".to_string());
        Self::wrap_message(message, default_code)
    }

    /// Classify a transport-level failure (no HTTP status was received).
    ///
    /// Always lands in the network band. Only the source chain is scanned;
    /// reqwest's own message embeds the request URL, whose path must not
    /// steer the code.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        let message = classify::error_chain(err);
        let code = if err.is_timeout() {
            ErrorCode::NetworkTimeout
        } else if err.is_decode() {
            ErrorCode::NetworkInvalidResponse
        } else if err.is_connect() || err.is_request() || err.is_body() {
            ErrorCode::NetworkUnreachable
        } else {
            let causes = err
                .source()
                .map(classify::error_chain)
                .unwrap_or_default();
            match classify::derive_code_from_message(&causes) {
                code if code.band() == ErrorBand::Network => code,
                _ => ErrorCode::NetworkUnreachable,
            }
        };
        let mut app = Self::with_message(code, message);
        if let Some(url) = err.url() {
            app = app.with_detail("url", url.as_str());
        }
        app
    }

    fn wrap_message(message: String, default_code: ErrorCode) -> Self {
        let message = if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        };
        Self::with_message(default_code, message)
    }

    pub fn with_details(mut self, details: Details) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = user_message.into();
        self
    }

    pub fn with_action(mut self, action: Option<String>) -> Self {
        self.action = action;
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    /// The taxonomy entry, when this build knows the code.
    pub fn known_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_u32(self.code)
    }

    pub fn band(&self) -> Option<ErrorBand> {
        ErrorBand::of(self.code)
    }

    pub fn is_auth_error(&self) -> bool {
        ErrorBand::Auth.includes(self.code)
    }

    pub fn is_validation_error(&self) -> bool {
        ErrorBand::Validation.includes(self.code)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    pub fn details(&self) -> Option<&Details> {
        self.details.as_ref()
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Backtrace captured at construction, if `RUST_BACKTRACE` enabled it.
    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn serialize(&self) -> SerializedError {
        SerializedError {
            code: self.code,
            message: self.message.clone(),
            user_message: self.user_message.clone(),
            action: self.action.clone(),
            retryable: self.retryable,
            details: self.details.clone(),
        }
    }
}

impl From<ErrorCode> for AppError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        classify::translate_io_error(&err)
    }
}

#[cfg(test)]
mod tests;
