//! Outbound request layer.
//!
//! Every call a console screen makes goes through [`ApiClient::request`]:
//! the CSRF token is attached to state-changing verbs, each attempt is
//! bounded by a timeout, failures are classified into an [`AppError`], and
//! retryable failures are re-attempted with exponential backoff.

pub mod body;
pub mod cookies;
pub mod retry;

pub use cookies::{CookieJar, CookieSource, NoCookies};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};

use crate::config::HttpConfig;
use crate::errors::classify::parse_error_envelope;
use crate::errors::{AppError, AppResult, ErrorCode};
use body::{MAX_ERROR_BODY_BYTES, read_error_body};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

const ERROR_SNIPPET_CHARS: usize = 500;

/// Payload of one outbound call. `Text` is sent as JSON unless the caller
/// already set a content type; `Bytes` is sent untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl RequestBody {
    fn to_reqwest(&self) -> reqwest::Body {
        match self {
            Self::Text(text) => reqwest::Body::from(text.clone()),
            Self::Bytes(bytes) => reqwest::Body::from(bytes.clone()),
        }
    }
}

/// Per-call options. Unset fields fall back to the client's [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub timeout_ms: Option<u64>,
    pub retry: Option<bool>,
    pub max_retries: Option<u32>,
    /// Aborts the whole call, including pending retries.
    pub cancel: Option<CancellationToken>,
}

impl RequestConfig {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = Some(retry);
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

fn build_client(connect_timeout: Duration) -> Client {
    Client::builder()
        .connect_timeout(connect_timeout)
        .user_agent(format!("stackdeck/{}", crate::VERSION))
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn is_state_changing(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn invalid_url(raw: &str, reason: impl std::fmt::Display) -> AppError {
    AppError::with_message(
        ErrorCode::ValidationInvalidFormat,
        format!("Invalid request URL '{raw}': {reason}"),
    )
    .with_detail("url", raw)
}

/// Races `fut` against `cancel`; `None` means the token fired first.
async fn until_cancelled<F: Future>(
    cancel: Option<&CancellationToken>,
    fut: F,
) -> Option<F::Output> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => None,
            out = fut => Some(out),
        },
        None => Some(fut.await),
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Option<Url>,
    cookies: Arc<dyn CookieSource>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
    csrf_cookie: String,
    csrf_header: HeaderName,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            http: build_client(Duration::from_secs(10)),
            base_url: None,
            cookies: Arc::new(NoCookies),
            sleeper: Arc::new(TokioSleeper),
            policy: RetryPolicy::default(),
            csrf_cookie: cookies::DEFAULT_CSRF_COOKIE.to_string(),
            csrf_header: HeaderName::from_static(cookies::DEFAULT_CSRF_HEADER),
        }
    }

    pub fn from_config(config: &HttpConfig) -> AppResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .map(|raw| Url::parse(raw).map_err(|e| invalid_url(raw, e)))
            .transpose()?;
        let csrf_header = HeaderName::from_bytes(config.csrf_header.trim().as_bytes())
            .map_err(|e| {
                AppError::validation(
                    format!("invalid CSRF header name '{}': {e}", config.csrf_header),
                    None,
                )
            })?;
        Ok(Self {
            http: build_client(Duration::from_millis(config.connect_timeout_ms)),
            base_url,
            cookies: Arc::new(NoCookies),
            sleeper: Arc::new(TokioSleeper),
            policy: config.retry_policy(),
            csrf_cookie: config.csrf_cookie.trim().to_string(),
            csrf_header,
        })
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = cookies;
        self
    }

    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    #[must_use]
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn resolve_url(&self, raw: &str) -> AppResult<Url> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(raw).map_err(|e| invalid_url(raw, e)),
                None => Err(invalid_url(raw, "relative URL without a base URL")),
            },
            Err(e) => Err(invalid_url(raw, e)),
        }
    }

    fn prepare_headers(
        &self,
        method: &Method,
        mut headers: HeaderMap,
        body: Option<&RequestBody>,
    ) -> HeaderMap {
        if is_state_changing(method) && !headers.contains_key(&self.csrf_header) {
            match self
                .cookies
                .cookie(&self.csrf_cookie)
                .and_then(|token| HeaderValue::from_str(&token).ok())
            {
                Some(value) => {
                    headers.insert(self.csrf_header.clone(), value);
                }
                None => debug!(
                    "No '{}' cookie, sending {} without CSRF header",
                    self.csrf_cookie, method
                ),
            }
        }
        if matches!(body, Some(RequestBody::Text(_))) && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers
    }

    /// Send one logical call, retrying transient failures.
    ///
    /// Attempts are strictly sequential. Auth and validation failures are
    /// returned after the first attempt; other retryable failures are
    /// re-attempted up to the effective `max_retries`, sleeping
    /// `base_delay * 2^attempt` in between. The last classified error is
    /// returned once retries are exhausted.
    pub async fn request(&self, url: &str, config: RequestConfig) -> AppResult<Response> {
        let RequestConfig {
            method,
            headers,
            body,
            timeout_ms,
            retry,
            max_retries,
            cancel,
        } = config;

        let url = self.resolve_url(url)?;
        let headers = self.prepare_headers(&method, headers, body.as_ref());
        let timeout = self.policy.effective_timeout(timeout_ms);
        let max_retries = self.policy.effective_max_retries(retry, max_retries);
        let cancel = cancel.as_ref();

        let mut attempt: u32 = 0;
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(AppError::cancelled().with_detail("url", url.as_str()));
            }
            debug!("{} {} (attempt {})", method, url, attempt);

            let outcome = until_cancelled(
                cancel,
                self.attempt(&method, &url, &headers, body.as_ref(), timeout),
            )
            .await;
            let error = match outcome {
                None => return Err(AppError::cancelled().with_detail("url", url.as_str())),
                Some(Ok(response)) => {
                    debug!("{} {} succeeded on attempt {}", method, url, attempt);
                    return Ok(response);
                }
                Some(Err(error)) => error,
            };

            if !self.policy.should_retry(&error, attempt, max_retries) {
                return Err(error);
            }

            let delay = self.policy.backoff_delay(attempt);
            warn!(
                attempt = attempt + 1,
                max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                code = error.code(),
                "{} {} failed, retrying: {}",
                method,
                url,
                error
            );
            if until_cancelled(cancel, self.sleeper.sleep(delay))
                .await
                .is_none()
            {
                return Err(AppError::cancelled().with_detail("url", url.as_str()));
            }
            attempt += 1;
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: Option<&RequestBody>,
        timeout: Duration,
    ) -> AppResult<Response> {
        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .headers(headers.clone());
        if let Some(body) = body {
            builder = builder.body(body.to_reqwest());
        }

        let call = async {
            match builder.send().await {
                Ok(response) if response.status().is_success() => Ok(response),
                Ok(response) => Err(error_from_response(response).await),
                Err(e) => Err(AppError::from_reqwest(&e)),
            }
        };

        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                Err(AppError::with_message(
                    ErrorCode::NetworkTimeout,
                    format!("Request timed out after {ms}ms"),
                )
                .with_detail("timeoutMs", ms)
                .with_detail("url", url.as_str()))
            }
        }
    }

    pub async fn get(&self, url: &str, config: RequestConfig) -> AppResult<Response> {
        self.request(url, with_method(config, Method::GET, None))
            .await
    }

    pub async fn post<B>(
        &self,
        url: &str,
        body: Option<&B>,
        config: RequestConfig,
    ) -> AppResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let body = encode_body(body)?;
        self.request(url, with_method(config, Method::POST, body))
            .await
    }

    pub async fn put<B>(
        &self,
        url: &str,
        body: Option<&B>,
        config: RequestConfig,
    ) -> AppResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let body = encode_body(body)?;
        self.request(url, with_method(config, Method::PUT, body))
            .await
    }

    pub async fn patch<B>(
        &self,
        url: &str,
        body: Option<&B>,
        config: RequestConfig,
    ) -> AppResult<Response>
    where
        B: Serialize + ?Sized + Sync,
    {
        let body = encode_body(body)?;
        self.request(url, with_method(config, Method::PATCH, body))
            .await
    }

    pub async fn delete(&self, url: &str, config: RequestConfig) -> AppResult<Response> {
        self.request(url, with_method(config, Method::DELETE, None))
            .await
    }

    /// `request` followed by [`decode_json`].
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        url: &str,
        config: RequestConfig,
    ) -> AppResult<T> {
        let response = self.request(url, config).await?;
        decode_json(response).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        config: RequestConfig,
    ) -> AppResult<T> {
        self.send_json(url, with_method(config, Method::GET, None))
            .await
    }
}

fn with_method(
    mut config: RequestConfig,
    method: Method,
    body: Option<RequestBody>,
) -> RequestConfig {
    config.method = method;
    if body.is_some() {
        config.body = body;
    }
    config
}

fn encode_body<B: Serialize + ?Sized>(body: Option<&B>) -> AppResult<Option<RequestBody>> {
    body.map(|b| {
        serde_json::to_string(b).map(RequestBody::Text).map_err(|e| {
            AppError::with_message(
                ErrorCode::ValidationInvalidFormat,
                format!("Failed to encode request body: {e}"),
            )
        })
    })
    .transpose()
}

/// Decode a successful body. A body that is not the expected JSON is an
/// invalid response, not a transient failure.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let url = response.url().to_string();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::from_reqwest(&e))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::with_message(
            ErrorCode::NetworkInvalidResponse,
            format!("Failed to decode response from {url}: {e}"),
        )
        .with_detail("url", url)
    })
}

/// Classify a non-2xx response, reading at most [`MAX_ERROR_BODY_BYTES`].
pub async fn error_from_response(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = match read_error_body(response, MAX_ERROR_BODY_BYTES).await {
        Ok(text) => text,
        Err(e) => {
            debug!("Could not read HTTP {} error body: {:#}", status, e);
            String::new()
        }
    };
    error_from_status(status, &body)
}

/// Prefer the structured `{ "error": { ... } }` body; otherwise map the
/// status through [`ErrorCode::from_http_status`].
pub fn error_from_status(status: u16, body: &str) -> AppError {
    if let Some(error) = parse_error_envelope(body, status) {
        return error;
    }
    let code = ErrorCode::from_http_status(status);
    let snippet: String = body.trim().chars().take(ERROR_SNIPPET_CHARS).collect();
    let message = if snippet.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status}: {snippet}")
    };
    AppError::from_parts(code.as_u32(), Some(message), None, Some(status))
        .with_detail("status", status)
}
