use std::future::Future;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio_retry::RetryIf;
use tracing::warn;

use crate::error::types::ScreenerError;
use crate::models::check::CheckCategory;

/// Configuration for the bounded-retry wrapper applied to every check
/// invocation. One wrapper, one policy; call sites never roll their own
/// retry loops.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (default: 2, so up to 3 attempts).
    pub max_retries: u32,
    /// Base delay for exponential backoff in milliseconds (default: 200ms).
    pub base_delay_ms: u64,
    /// Maximum delay cap in milliseconds (default: 2000ms).
    pub max_delay_ms: u64,
    /// Jitter factor to prevent thundering herd (0.0 to 1.0, default: 0.1).
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 200,
            max_delay_ms: 2_000,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Policy for risk check invocations.
    pub fn for_checks() -> Self {
        Self::default()
    }

    /// No retries and no waiting; used by tests and cache-only paths.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter_factor: 0.0,
        }
    }

    /// Exponential backoff schedule, capped and jittered. One entry per
    /// retry; the first attempt never waits.
    pub fn delays(&self) -> Vec<Duration> {
        let mut rng = rand::thread_rng();
        (0..self.max_retries)
            .map(|attempt| {
                let exponential = self.base_delay_ms as f64 * 2f64.powi(attempt as i32);
                let capped = exponential.min(self.max_delay_ms as f64);
                let jitter_range = capped * self.jitter_factor;
                let jitter = rng.gen_range(-jitter_range..=jitter_range);
                Duration::from_millis((capped + jitter).max(0.0) as u64)
            })
            .collect()
    }
}

/// Executes a check operation with bounded exponential-backoff retries.
/// Retries only errors classified retryable; permanent errors surface
/// immediately.
pub async fn retry_check<F, Fut, T>(
    category: CheckCategory,
    config: &RetryConfig,
    operation: F,
) -> Result<T, ScreenerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScreenerError>>,
{
    RetryIf::spawn(config.delays(), operation, |error: &ScreenerError| {
        let retryable = error.is_retryable();
        if retryable {
            warn!(
                category = %category,
                error = %error,
                "Check attempt failed, retrying"
            );
        }
        retryable
    })
    .await
}

/// Bounds a single check attempt to its time budget, mapping elapsed time
/// to a typed timeout error.
pub async fn with_timeout<F, T>(
    category: CheckCategory,
    budget: Duration,
    future: F,
) -> Result<T, ScreenerError>
where
    F: Future<Output = Result<T, ScreenerError>>,
{
    match tokio::time::timeout(budget, future).await {
        Ok(result) => result,
        Err(_) => Err(ScreenerError::CheckTimeout {
            category,
            millis: budget.as_millis() as u64,
        }),
    }
}
