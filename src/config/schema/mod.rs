use crate::errors::{AppError, Details};
use crate::http::cookies::{DEFAULT_CSRF_COOKIE, DEFAULT_CSRF_HEADER};
use crate::http::retry::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS, RetryPolicy,
};
use serde::{Deserialize, Serialize};

/// Retry ceiling accepted from configuration.
pub const MAX_CONFIGURED_RETRIES: u32 = 10;

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Build flavour. Diagnostics (technical messages, stacks) are only ever
/// rendered outside production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Some(Self::Development),
            "prod" | "production" => Some(Self::Production),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_csrf_cookie() -> String {
    DEFAULT_CSRF_COOKIE.to_string()
}

fn default_csrf_header() -> String {
    DEFAULT_CSRF_HEADER.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Relative request paths are joined onto this.
    #[serde(default, rename = "baseUrl")]
    pub base_url: Option<String>,
    /// Per-attempt timeout.
    #[serde(default = "default_timeout_ms", rename = "timeoutMs")]
    pub timeout_ms: u64,
    #[serde(default = "default_true")]
    pub retry: bool,
    #[serde(default = "default_max_retries", rename = "maxRetries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms", rename = "baseDelayMs")]
    pub base_delay_ms: u64,
    #[serde(default = "default_connect_timeout_ms", rename = "connectTimeoutMs")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_csrf_cookie", rename = "csrfCookie")]
    pub csrf_cookie: String,
    #[serde(default = "default_csrf_header", rename = "csrfHeader")]
    pub csrf_header: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            retry: true,
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            csrf_cookie: default_csrf_cookie(),
            csrf_header: default_csrf_header(),
        }
    }
}

impl HttpConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout_ms: self.timeout_ms,
            retry: self.retry,
            max_retries: self.max_retries,
            base_delay_ms: self.base_delay_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub environment: Environment,
    /// Raw `Cookie:` header used to seed the read-only cookie jar.
    #[serde(default)]
    pub cookies: Option<String>,
}

fn invalid(field: &str, message: &str) -> AppError {
    let mut details = Details::new();
    details.insert("field".into(), field.into());
    AppError::validation(format!("{field} {message}"), Some(details))
}

impl ConsoleConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        let h = &self.http;
        if h.timeout_ms == 0 {
            return Err(invalid("http.timeoutMs", "must be > 0"));
        }
        if h.base_delay_ms == 0 {
            return Err(invalid("http.baseDelayMs", "must be > 0"));
        }
        if h.max_retries > MAX_CONFIGURED_RETRIES {
            return Err(invalid(
                "http.maxRetries",
                &format!("must be <= {MAX_CONFIGURED_RETRIES}"),
            ));
        }
        if h.csrf_cookie.trim().is_empty() {
            return Err(invalid("http.csrfCookie", "must not be empty"));
        }
        if h.csrf_header.trim().is_empty() {
            return Err(invalid("http.csrfHeader", "must not be empty"));
        }
        if let Some(base) = &h.base_url
            && url::Url::parse(base).is_err()
        {
            return Err(invalid("http.baseUrl", "must be an absolute URL"));
        }
        Ok(())
    }
}
