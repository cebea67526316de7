use crate::errors::AppError;
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Client-wide retry defaults. Each call may override `timeout_ms`,
/// `retry` and `max_retries` through its `RequestConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout_ms: u64,
    pub retry: bool,
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: true,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    pub fn effective_timeout(&self, timeout_ms: Option<u64>) -> Duration {
        Duration::from_millis(timeout_ms.unwrap_or(self.timeout_ms))
    }

    /// Retries allowed for one call: zero when retry is switched off.
    pub fn effective_max_retries(&self, retry: Option<bool>, max_retries: Option<u32>) -> u32 {
        if retry.unwrap_or(self.retry) {
            max_retries.unwrap_or(self.max_retries)
        } else {
            0
        }
    }

    /// Delay before the retry that follows `attempt` (zero-based):
    /// `base * 2^attempt`, saturating.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Auth and validation failures are never retried; nothing is retried
    /// once the ceiling is reached. Otherwise the error's own flag decides.
    pub fn should_retry(&self, error: &AppError, attempt: u32, max_retries: u32) -> bool {
        if attempt >= max_retries {
            return false;
        }
        if error.is_auth_error() || error.is_validation_error() {
            return false;
        }
        error.is_retryable()
    }
}

/// Suspends between attempts. Swappable so backoff can be observed without
/// waiting on the wall clock.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
