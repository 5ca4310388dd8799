//! Bounded exponential backoff for media store calls.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::AssetError;
use crate::domain::models::RetryConfig;

/// Retry policy configuration for handling transient errors
///
/// Backoff doubles with each retry: initial → 2×initial → 4×initial …,
/// capped at `max_backoff_ms`. Only [`AssetError::is_transient`] errors
/// are retried; everything else is returned on first sight.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    max_attempts: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// `max_attempts` is clamped to at least one, and `max_backoff_ms` to at
    /// least `initial_backoff_ms`.
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff_ms,
            max_backoff_ms: max_backoff_ms.max(initial_backoff_ms),
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Execute an operation with exponential backoff retry logic
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut call: F) -> Result<T, AssetError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AssetError>>,
    {
        let mut attempt = 1;

        loop {
            match call(attempt).await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "operation succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if self.should_retry(&err, attempt) {
                        let backoff = self.calculate_backoff(attempt - 1);
                        warn!(
                            operation,
                            attempt,
                            max_attempts = self.max_attempts,
                            error = %err,
                            backoff_ms = backoff.as_millis() as u64,
                            "transient media store error, retrying"
                        );
                        sleep(backoff).await;
                        attempt += 1;
                    } else {
                        if err.is_transient() {
                            warn!(operation, attempts = attempt, error = %err, "giving up after retries");
                        } else {
                            debug!(operation, error = %err, "permanent error, not retrying");
                        }
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Calculate exponential backoff duration for a given retry
    ///
    /// Formula: min(initial_backoff * 2^retry, max_backoff)
    fn calculate_backoff(&self, retry: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(retry))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &AssetError, attempt: u32) -> bool {
        attempt < self.max_attempts && error.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.initial_backoff_ms, config.max_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::new(5, 1000, 6000);

        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.calculate_backoff(2), Duration::from_millis(4000));
        assert_eq!(policy.calculate_backoff(3), Duration::from_millis(6000)); // capped
        assert_eq!(policy.calculate_backoff(40), Duration::from_millis(6000));
    }

    #[test]
    fn test_policy_clamps_inputs() {
        let policy = RetryPolicy::new(0, 500, 100);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_transient_errors_retried_until_success() {
        let policy = RetryPolicy::new(3, 1, 5);
        let calls = AtomicU32::new(0);

        let result = policy
            .execute("upload", |_| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(AssetError::StoreUnavailable("503".into()))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_transient_errors_bounded() {
        let policy = RetryPolicy::new(3, 1, 5);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .execute("destroy", |_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AssetError::StoreUnavailable("timeout".into()))
            })
            .await;

        assert!(matches!(result, Err(AssetError::StoreUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_not_retried() {
        let policy = RetryPolicy::new(3, 1, 5);
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .execute("upload", |_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(AssetError::Rejected { status: 400, message: "bad file".into() })
            })
            .await;

        assert!(matches!(result, Err(AssetError::Rejected { status: 400, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
