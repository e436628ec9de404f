//! Retry policy with fixed backoff
//!
//! Every call to the completion service goes through this wrapper:
//! - Max attempts: 3 by default
//! - Backoff: fixed 2s sleep between attempts, none after the last
//! - Success: `Ok` value accepted by the caller's predicate
//! - Permanent errors (config, store, I/O) are returned without retrying

use crate::errors::{IncidentError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Default number of attempts per operation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default sleep between attempts
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

/// Fixed-interval retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first one
    max_attempts: u32,

    /// Sleep between consecutive attempts
    backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF)
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Execute `operation` until it yields a value accepted by `accept`.
    ///
    /// A transient error or a rejected value counts as a failed attempt. When
    /// every attempt fails the last failure is wrapped in
    /// [`IncidentError::RetriesExhausted`].
    pub async fn execute_with_retry<F, Fut, T, P>(
        &self,
        operation_name: &str,
        mut operation: F,
        accept: P,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
        P: Fn(&T) -> bool,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let failure = match operation().await {
                Ok(value) if accept(&value) => return Ok(value),
                Ok(_) => IncidentError::MalformedResponse("response rejected".to_string()),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => e,
            };

            warn!(
                operation = operation_name,
                attempt,
                max_attempts = self.max_attempts,
                error = %failure,
                "{} failed (attempt {})",
                operation_name,
                attempt
            );

            if attempt >= self.max_attempts {
                return Err(IncidentError::RetriesExhausted {
                    operation: operation_name.to_string(),
                    attempts: attempt,
                    last_error: failure.to_string(),
                });
            }

            if !self.backoff.is_zero() {
                sleep(self.backoff).await;
            }
        }
    }

    /// Worst-case time spent sleeping across all attempts
    pub fn max_total_wait(&self) -> Duration {
        self.backoff * (self.max_attempts - 1)
    }

    /// Get max attempts
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get backoff interval
    pub fn backoff(&self) -> Duration {
        self.backoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let attempt_count = Arc::new(Mutex::new(0));
        let count_clone = attempt_count.clone();

        let result = fast_policy()
            .execute_with_retry(
                "test op",
                move || {
                    let count = count_clone.clone();
                    async move {
                        *count.lock().unwrap() += 1;
                        Ok::<i32, IncidentError>(42)
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(*attempt_count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let attempt_count = Arc::new(Mutex::new(0));
        let count_clone = attempt_count.clone();

        let result = fast_policy()
            .execute_with_retry(
                "test op",
                move || {
                    let count = count_clone.clone();
                    async move {
                        let mut attempts = count.lock().unwrap();
                        *attempts += 1;
                        if *attempts < 3 {
                            Err(IncidentError::ServiceError("503".to_string()))
                        } else {
                            Ok(7)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(*attempt_count.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_retry_max_attempts_exceeded() {
        let attempt_count = Arc::new(Mutex::new(0));
        let count_clone = attempt_count.clone();

        let result = fast_policy()
            .execute_with_retry(
                "test op",
                move || {
                    let count = count_clone.clone();
                    async move {
                        *count.lock().unwrap() += 1;
                        Err::<i32, _>(IncidentError::ServiceError("always down".to_string()))
                    }
                },
                |_| true,
            )
            .await;

        match result {
            Err(IncidentError::RetriesExhausted { attempts, last_error, .. }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("always down"));
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(*attempt_count.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_non_transient_error_not_retried() {
        let attempt_count = Arc::new(Mutex::new(0));
        let count_clone = attempt_count.clone();

        let result = fast_policy()
            .execute_with_retry(
                "test op",
                move || {
                    let count = count_clone.clone();
                    async move {
                        *count.lock().unwrap() += 1;
                        Err::<i32, _>(IncidentError::ConfigError("no model".to_string()))
                    }
                },
                |_| true,
            )
            .await;

        assert!(matches!(result, Err(IncidentError::ConfigError(_))));
        assert_eq!(*attempt_count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejected_value_counts_as_failure() {
        let attempt_count = Arc::new(Mutex::new(0));
        let count_clone = attempt_count.clone();

        let result = fast_policy()
            .execute_with_retry(
                "test op",
                move || {
                    let count = count_clone.clone();
                    async move {
                        let mut attempts = count.lock().unwrap();
                        *attempts += 1;
                        Ok::<String, IncidentError>(if *attempts == 2 {
                            "usable".to_string()
                        } else {
                            String::new()
                        })
                    }
                },
                |text: &String| !text.is_empty(),
            )
            .await;

        assert_eq!(result.unwrap(), "usable");
        assert_eq!(*attempt_count.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);

        let result = policy
            .execute_with_retry(
                "test op",
                || async { Err::<(), _>(IncidentError::Generic("nope".to_string())) },
                |_| true,
            )
            .await;

        assert!(matches!(
            result,
            Err(IncidentError::RetriesExhausted { attempts: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_between_attempts_only() {
        let backoff = Duration::from_millis(50);
        let started = tokio::time::Instant::now();
        let attempts_at = Arc::new(Mutex::new(Vec::new()));
        let attempts_clone = attempts_at.clone();

        let result = RetryPolicy::new(3, backoff)
            .execute_with_retry(
                "test op",
                move || {
                    let attempts = attempts_clone.clone();
                    async move {
                        attempts.lock().unwrap().push(tokio::time::Instant::now());
                        Err::<(), _>(IncidentError::ServiceError("down".to_string()))
                    }
                },
                |_| true,
            )
            .await;

        assert!(matches!(
            result,
            Err(IncidentError::RetriesExhausted { attempts: 3, .. })
        ));

        let attempts = attempts_at.lock().unwrap();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[0], started);
        for pair in attempts.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= backoff && gap < backoff + Duration::from_millis(5), "gap {:?}", gap);
        }
        // nothing sleeps after the final attempt
        assert_eq!(started.elapsed(), attempts[2] - started);
        assert!(started.elapsed() < backoff * 3);
    }

    #[test]
    fn test_max_total_wait() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_total_wait(), Duration::from_secs(4));
        assert_eq!(policy.backoff(), Duration::from_secs(2));
    }
}
