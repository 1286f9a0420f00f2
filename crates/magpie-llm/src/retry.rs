//! Explicit retry policy for model calls

use crate::LlmError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Extra fixed pause after an HTTP 429, on top of the normal backoff
pub const RATE_LIMIT_COOLDOWN_SECS: u64 = 5;

/// Bounded retry with clamped exponential backoff
///
/// The policy is its own value so it can be tested without a network and
/// tuned without touching the provider: `max_attempts` total tries, a
/// backoff of `base_delay * 2^(attempt-1)` clamped into
/// `[min_delay, max_delay]`, and retries only for errors whose
/// [`LlmError::is_transient`] is true. A rate-limited attempt sleeps an
/// additional fixed cooldown before the backoff.
///
/// # Examples
///
/// ```
/// use magpie_llm::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.backoff(1), Duration::from_secs(2)); // 1s clamped up
/// assert_eq!(policy.backoff(3), Duration::from_secs(4));
/// assert_eq!(policy.backoff(6), Duration::from_secs(10)); // clamped down
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Base of the exponential backoff
    pub base_delay: Duration,
    /// Lower clamp on the backoff
    pub min_delay: Duration,
    /// Upper clamp on the backoff
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Backoff before the retry that follows `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.as_secs_f64() * 2f64.powi(attempt.saturating_sub(1) as i32);
        Duration::from_secs_f64(exp.clamp(
            self.min_delay.as_secs_f64(),
            self.max_delay.as_secs_f64(),
        ))
    }

    /// Run `op` under this policy.
    ///
    /// Transient errors are retried until the attempt budget is spent; the
    /// final error is returned unchanged. Non-transient errors return
    /// immediately.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    if matches!(err, LlmError::RateLimited) {
                        warn!("rate limited, cooling down {RATE_LIMIT_COOLDOWN_SECS}s");
                        tokio::time::sleep(Duration::from_secs(RATE_LIMIT_COOLDOWN_SECS)).await;
                    }
                    let delay = self.backoff(attempt);
                    warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "model call failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_backoff_is_clamped_both_ways() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(4), Duration::from_secs(8));
        assert_eq!(policy.backoff(5), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_exhaust_the_budget() {
        let policy = RetryPolicy::default();
        let calls = AtomicUsize::new(0);

        let result: Result<(), LlmError> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(LlmError::Timeout) }
            })
            .await;

        assert!(matches!(result, Err(LlmError::Timeout)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failure() {
        let policy = RetryPolicy::default();
        let calls = AtomicUsize::new(0);

        let result = policy
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(LlmError::Communication("connection reset".into()))
                    } else {
                        Ok("done".to_string())
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_errors_do_not_retry() {
        let policy = RetryPolicy::default();
        let calls = AtomicUsize::new(0);

        let result: Result<(), LlmError> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(LlmError::Upstream {
                        status: 401,
                        body: "bad key".into(),
                    })
                }
            })
            .await;

        assert!(matches!(result, Err(LlmError::Upstream { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
