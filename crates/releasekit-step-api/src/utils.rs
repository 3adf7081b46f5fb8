//! Common utilities for step implementations

use std::future::Future;
use std::time::Duration;

use crate::{
    StepError,
    StepResult,
};

/// Fixed-count retry with a pause between attempts.
///
/// Deliberately simple: asset uploads and similar flaky remote calls get a
/// handful of attempts with a constant pause, nothing more.
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: usize,
    /// Pause between attempts
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            pause: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, pause: Duration) -> Self {
        Self {
            max_attempts,
            pause,
        }
    }

    /// Executes an operation, retrying network and API failures.
    ///
    /// `on_retry` runs between attempts, before the pause; callers use it to
    /// undo the side effects of a failed attempt, such as deleting a
    /// half-uploaded asset. Other error kinds (validation, configuration)
    /// are returned immediately; retrying would not change the outcome.
    pub async fn retry_with<F, Fut, T, C, CFut>(&self, operation: F, on_retry: C) -> StepResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = StepResult<T>>,
        C: Fn() -> CFut,
        CFut: Future<Output = ()>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => match &e {
                    StepError::Network(_) | StepError::Api(_) if attempt < self.max_attempts => {
                        tracing::warn!(attempt, error = %e, "retrying after failure");
                        last_error = Some(e);
                        on_retry().await;
                        tokio::time::sleep(self.pause).await;
                    }
                    _ => return Err(e),
                },
            }
        }

        Err(last_error.unwrap_or_else(|| StepError::Network("Max attempts exceeded".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn test_retry_success() {
        let policy = RetryPolicy::default();
        let result = policy
            .retry_with(|| async { Ok::<_, StepError>(42) }, || async {})
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_eventual_success() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let attempts = Cell::new(0);

        let result = policy
            .retry_with(
                || async {
                    let count = attempts.get() + 1;
                    attempts.set(count);
                    if count < 2 {
                        Err(StepError::Network("Temporary failure".to_string()))
                    } else {
                        Ok(42)
                    }
                },
                || async {},
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 2);
    }

    #[tokio::test]
    async fn test_cleanup_runs_between_failed_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1));
        let cleanups = Cell::new(0);

        let result: StepResult<()> = policy
            .retry_with(
                || async { Err(StepError::Api("HTTP 502".to_string())) },
                || async { cleanups.set(cleanups.get() + 1) },
            )
            .await;

        assert!(result.is_err());
        // Two retries after three failed attempts, no cleanup after the last
        assert_eq!(cleanups.get(), 2);
    }

    #[tokio::test]
    async fn test_validation_errors_are_not_retried() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let attempts = Cell::new(0);

        let result: StepResult<()> = policy
            .retry_with(
                || async {
                    attempts.set(attempts.get() + 1);
                    Err(StepError::Validation("bad field".to_string()))
                },
                || async {},
            )
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.get(), 1);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_returns_last_error() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1));
        let result: StepResult<()> = policy
            .retry_with(
                || async { Err(StepError::Api("HTTP 502".to_string())) },
                || async {},
            )
            .await;
        assert!(result.unwrap_err().to_string().contains("502"));
    }
}
