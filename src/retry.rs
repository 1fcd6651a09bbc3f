//! Retry logic with exponential backoff
//!
//! Every remote call goes through [`RetryGovernor::call`]. Failures are
//! classified with [`IsRetryable`]: transient ones (transport errors, 5xx,
//! rate limits, quota signals) are retried with exponential backoff and
//! optional jitter; anything else aborts immediately.
//!
//! # Example
//!
//! ```no_run
//! use yt_view_stats::config::RetryConfig;
//! use yt_view_stats::retry::{GovernorError, IsRetryable, with_retry};
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), GovernorError<MyError>> {
//! let config = RetryConfig::default();
//! let value = with_retry(&config, "my.operation", |_, _| {}, || async {
//!     Ok::<_, MyError>(42)
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::{ApiError, Error};
use crate::types::Event;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;

/// Google error reasons that signal rate limiting or quota exhaustion
const RETRYABLE_REASONS: &[&str] = &[
    "quotaExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
    "dailyLimitExceeded",
    "backendError",
];

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, server busy, rate limits) should return `true`.
/// Permanent failures (bad key, malformed request, not found) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for ApiError {
    fn is_retryable(&self) -> bool {
        match self {
            // Anything below HTTP (connect, timeout, TLS, truncated body)
            ApiError::Transport(_) => true,
            ApiError::Status { status, reason, .. } => match status {
                429 => true,
                500..=599 => true,
                // YouTube reports quota and rate limits as 403 with a reason
                403 => reason
                    .as_deref()
                    .is_some_and(|r| RETRYABLE_REASONS.contains(&r)),
                // 400 bad request, 401 bad key, 404 not found, everything else
                _ => false,
            },
            ApiError::Malformed(_) => false,
        }
    }
}

/// Why a governed call gave up
#[derive(Debug)]
pub enum GovernorError<E> {
    /// The failure was not retryable
    Fatal(E),
    /// Every allowed attempt failed transiently
    Exhausted {
        /// Attempts made, including the first
        attempts: u32,
        /// The last failure observed
        last: E,
    },
}

impl<E: std::fmt::Display> std::fmt::Display for GovernorError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GovernorError::Fatal(e) => write!(f, "{}", e),
            GovernorError::Exhausted { attempts, last } => {
                write!(f, "gave up after {} attempts: {}", attempts, last)
            }
        }
    }
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for GovernorError<E> {}

impl GovernorError<ApiError> {
    /// Convert into the pipeline error for a named operation
    pub fn into_error(self, operation: &'static str) -> Error {
        match self {
            GovernorError::Fatal(source) => Error::FatalApi { operation, source },
            GovernorError::Exhausted { attempts, last } => Error::TransientApi {
                operation,
                attempts,
                source: last,
            },
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays, backoff multiplier, jitter)
/// * `operation` - Name of the operation, for logging
/// * `on_retry` - Called with the failed attempt number and the upcoming delay
/// * `op` - Async closure that returns `Result<T, E>` where E implements IsRetryable
///
/// `config.max_attempts` counts the first attempt, so a value of 1 disables
/// retrying altogether.
pub async fn with_retry<F, Fut, T, E, R>(
    config: &RetryConfig,
    operation: &str,
    mut on_retry: R,
    mut op: F,
) -> Result<T, GovernorError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
    R: FnMut(u32, Duration),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;
        match op().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(operation, attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !e.is_retryable() => {
                tracing::error!(operation, error = %e, "Operation failed with non-retryable error");
                return Err(GovernorError::Fatal(e));
            }
            Err(e) if attempt >= max_attempts => {
                tracing::error!(
                    operation,
                    error = %e,
                    attempts = attempt,
                    "Operation failed after all retry attempts exhausted"
                );
                return Err(GovernorError::Exhausted { attempts: attempt, last: e });
            }
            Err(e) => {
                // Jitter never pushes a wait past the cap
                let wait = if config.jitter {
                    add_jitter(delay).min(config.max_delay)
                } else {
                    delay
                };

                tracing::warn!(
                    operation,
                    error = %e,
                    attempt,
                    max_attempts,
                    delay_ms = wait.as_millis() as u64,
                    "Operation failed, retrying"
                );
                on_retry(attempt, wait);

                tokio::time::sleep(wait).await;

                delay = next_delay(config, delay);
            }
        }
    }
}

/// Exponential step, capped at `max_delay`
///
/// A product too large for a `Duration` saturates to the cap.
fn next_delay(config: &RetryConfig, delay: Duration) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier)
        .map_or(config.max_delay, |next| next.min(config.max_delay))
}

/// Add random jitter to a delay to prevent thundering herd
///
/// Jitter is uniformly distributed between 0% and 100% of the delay.
/// This means the actual delay will be between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::try_from_secs_f64(jittered_secs).unwrap_or(delay)
}

/// Applies one [`RetryConfig`] uniformly to every remote API call of a request
#[derive(Clone, Debug)]
pub struct RetryGovernor {
    config: RetryConfig,
    events: Option<broadcast::Sender<Event>>,
}

impl RetryGovernor {
    /// Create a governor with the given retry settings
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            events: None,
        }
    }

    /// Publish a [`Event::Retrying`] for every retry on this channel
    pub fn with_events(mut self, events: broadcast::Sender<Event>) -> Self {
        self.events = Some(events);
        self
    }

    /// The retry settings in effect
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run one API operation under the retry policy
    pub async fn call<F, Fut, T>(&self, operation: &'static str, op: F) -> crate::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let events = self.events.as_ref();
        with_retry(
            &self.config,
            operation,
            |attempt, delay| {
                if let Some(tx) = events {
                    // No subscribers is fine
                    let _ = tx.send(Event::Retrying {
                        operation: operation.to_string(),
                        attempt,
                        delay_ms: delay.as_millis() as u64,
                    });
                }
            },
            op,
        )
        .await
        .map_err(|e| e.into_error(operation))
    }
}

impl Default for RetryGovernor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
