//! Retry policy for generation calls whose result fails a quality check.
//!
//! `RetryPolicy` is a small stateless value (max attempts, backoff, base
//! delay) handed to call sites. `run` drives an async operation until its
//! value passes the caller's acceptance predicate or attempts run out.

use std::future::Future;
use std::time::Duration;

use saathi_types::config::{Backoff, RetryConfig};
use saathi_types::llm::GenerationError;
use tracing::debug;

/// Errors that know whether another attempt is worthwhile.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for GenerationError {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

/// Result of a retried operation.
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    /// The accepted value, the last produced value if none was accepted,
    /// or the last error if no attempt produced a value.
    pub result: Result<T, E>,
    /// Number of attempts made (1-based).
    pub attempts: u32,
    /// Whether `result` passed the acceptance predicate.
    pub accepted: bool,
}

/// Max attempts, backoff shape, and base delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            base_delay,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::new(1, Backoff::Fixed, Duration::ZERO)
    }

    /// Whether a retry should follow `attempt` (1-based).
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to wait after a failed `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Exponential => {
                let exponent = attempt.saturating_sub(1).min(16);
                self.base_delay.saturating_mul(1u32 << exponent)
            }
        }
    }

    /// Run `op` until `accept` holds for its value or attempts run out.
    ///
    /// Non-retryable errors stop immediately. When attempts run out, the
    /// most recent value is returned unaccepted in preference to an error.
    pub async fn run<T, E, F, Fut, A>(&self, mut op: F, accept: A) -> RetryOutcome<T, E>
    where
        E: Retryable,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        A: Fn(&T) -> bool,
    {
        let mut last_value: Option<T> = None;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) if accept(&value) => {
                    return RetryOutcome {
                        result: Ok(value),
                        attempts: attempt,
                        accepted: true,
                    };
                }
                Ok(value) => {
                    debug!(attempt, "result rejected by acceptance check");
                    if !self.should_retry(attempt) {
                        return RetryOutcome {
                            result: Ok(value),
                            attempts: attempt,
                            accepted: false,
                        };
                    }
                    last_value = Some(value);
                }
                Err(err) => {
                    let retryable = err.is_retryable();
                    if !retryable || !self.should_retry(attempt) {
                        return RetryOutcome {
                            result: last_value.map_or(Err(err), Ok),
                            attempts: attempt,
                            accepted: false,
                        };
                    }
                    debug!(attempt, "retryable error, trying again");
                }
            }

            let delay = self.delay_for(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.backoff,
            Duration::from_millis(config.base_delay_ms),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Backoff::Fixed, Duration::ZERO)
    }

    #[test]
    fn should_retry_within_limit() {
        let policy = quick(3);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        assert_eq!(quick(0).max_attempts, 1);
    }

    #[test]
    fn exponential_delay_doubles() {
        let policy = RetryPolicy::new(5, Backoff::Exponential, Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn fixed_delay_is_constant() {
        let policy = RetryPolicy::new(5, Backoff::Fixed, Duration::from_millis(100));
        assert_eq!(policy.delay_for(4), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn stops_at_first_accepted_value() {
        let calls = Cell::new(0);
        let outcome = quick(5)
            .run(
                |attempt| {
                    calls.set(calls.get() + 1);
                    async move { Ok::<_, GenerationError>(attempt) }
                },
                |value| *value >= 2,
            )
            .await;

        assert!(outcome.accepted);
        assert_eq!(outcome.result.unwrap(), 2);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn returns_last_value_when_never_accepted() {
        let outcome = quick(3)
            .run(
                |attempt| async move { Ok::<_, GenerationError>(attempt * 10) },
                |_| false,
            )
            .await;

        assert!(!outcome.accepted);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.result.unwrap(), 30);
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let outcome = quick(3)
            .run(
                |attempt| async move {
                    if attempt < 3 {
                        Err(GenerationError::Timeout(1))
                    } else {
                        Ok("done")
                    }
                },
                |_| true,
            )
            .await;

        assert!(outcome.accepted);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test]
    async fn permanent_error_stops_immediately() {
        let outcome = quick(5)
            .run(
                |_| async { Err::<String, _>(GenerationError::AuthenticationFailed) },
                |_| true,
            )
            .await;

        assert_eq!(outcome.attempts, 1);
        assert!(matches!(
            outcome.result,
            Err(GenerationError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn error_after_value_keeps_the_value() {
        let outcome = quick(2)
            .run(
                |attempt| async move {
                    if attempt == 1 {
                        Ok("draft".to_string())
                    } else {
                        Err(GenerationError::Timeout(1))
                    }
                },
                |_| false,
            )
            .await;

        assert!(!outcome.accepted);
        assert_eq!(outcome.result.unwrap(), "draft");
    }

    #[test]
    fn from_config() {
        let policy = RetryPolicy::from(&RetryConfig::default());
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Backoff::Exponential);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
    }
}
