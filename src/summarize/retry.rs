//! Bounded retry with exponential backoff for backend calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::error::SummarizeResult;

/// Retry policy for generation attempts.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Run `op` up to `policy.max_attempts` times, sleeping between attempts.
///
/// Every failure kind is retryable. The delay before attempt `k` (k >= 2) is
/// `base_delay * 2^(k-2)`, so the default policy sleeps 1s then 2s. When the
/// budget is exhausted the LAST attempt's error is returned alone: callers
/// need one clear terminal error, not a stack of transient ones.
///
/// # Errors
/// Returns the final attempt's error once all attempts are exhausted.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> SummarizeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SummarizeResult<T>>,
{
    let mut attempt = 1_u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= policy.max_attempts => return Err(err),
            Err(err) => {
                let delay = policy.base_delay * 2_u32.saturating_pow(attempt - 1);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "generation attempt failed, retrying: {err}"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::summarize::error::SummarizeError;

    fn flaky_op(
        calls: Arc<AtomicU32>,
        failures_before_success: u32,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = SummarizeResult<u32>> + Send>> {
        move || {
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n <= failures_before_success {
                    Err(SummarizeError::BackendTimeout)
                } else {
                    Ok(n)
                }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds_with_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::default();

        let start = tokio::time::Instant::now();
        let result = with_retry(&policy, flaky_op(Arc::clone(&calls), 2)).await;

        assert_eq!(result.ok(), Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Backoff slept 1s before attempt 2 and 2s before attempt 3.
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts_and_keeps_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::default();

        let result: SummarizeResult<u32> = with_retry(&policy, || {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(SummarizeError::BackendNotConfigured)
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(SummarizeError::BackendNotConfigured)));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt_does_not_sleep() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(60),
        };

        let result = with_retry(&policy, || async { Ok(42_u32) }).await;
        assert_eq!(result.ok(), Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_policy_never_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_secs(1),
        };

        let result = with_retry(&policy, flaky_op(Arc::clone(&calls), 5)).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
