//! Condition Evaluator
//!
//! Polls a live value source against a predicate until it holds or the
//! timeout elapses.
//!
//! ## Toyota Way Application:
//! - **Heijunka**: Consistent polling intervals for predictable test timing
//! - **Jidoka**: Stop with the last observed value when the timeout is spent

use crate::result::RetrievalError;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Shortest pause between attempts; smaller intervals are raised to it
pub const MIN_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Resolved `(timeout, interval)` pair governing a poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryOptions {
    /// Total time budget; zero means a single attempt
    pub timeout: Duration,
    /// Pause between attempts, never shorter than [`MIN_RETRY_INTERVAL`] when polling
    pub interval: Duration,
}

impl RetryOptions {
    /// Create retry options
    #[must_use]
    pub const fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Single attempt, no retry
    #[must_use]
    pub const fn once() -> Self {
        Self {
            timeout: Duration::ZERO,
            interval: Duration::ZERO,
        }
    }

    /// Whether these options allow more than one attempt
    #[must_use]
    pub const fn retries(&self) -> bool {
        !self.timeout.is_zero()
    }
}

/// Outcome of a poll loop
#[derive(Debug, Clone)]
pub struct Evaluation<T> {
    /// Whether the predicate held
    pub success: bool,
    /// Last value produced by the source
    pub last_value: Option<T>,
    /// Transient error raised by the most recent attempt, if it raised one
    pub last_error: Option<RetrievalError>,
    /// Number of attempts made
    pub attempts: usize,
    /// Time spent polling
    pub elapsed: Duration,
}

impl<T> Evaluation<T> {
    /// Whether the predicate never held
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !self.success
    }
}

/// Poll `producer` until `predicate` holds or `options.timeout` elapses.
///
/// Transient retrieval errors count as a mismatch and are retried. Any
/// other retrieval error stops polling and is returned as `Err`.
pub fn evaluate_until<T, P, F>(
    mut producer: P,
    mut predicate: F,
    options: RetryOptions,
) -> Result<Evaluation<T>, RetrievalError>
where
    P: FnMut() -> Result<T, RetrievalError>,
    F: FnMut(&T) -> bool,
{
    let start = Instant::now();
    let mut attempts = 0;
    let interval = options.interval.max(MIN_RETRY_INTERVAL);
    let mut last_value = None;

    loop {
        attempts += 1;

        let last_error = match producer() {
            Ok(value) => {
                if predicate(&value) {
                    return Ok(Evaluation {
                        success: true,
                        last_value: Some(value),
                        last_error: None,
                        attempts,
                        elapsed: start.elapsed(),
                    });
                }
                last_value = Some(value);
                None
            }
            Err(err) if err.is_transient() => {
                tracing::trace!(target: "pagecheck", attempts, error = %err, "value unavailable");
                Some(err)
            }
            Err(err) => return Err(err),
        };

        let elapsed = start.elapsed();
        if elapsed >= options.timeout {
            return Ok(Evaluation {
                success: false,
                last_value,
                last_error,
                attempts,
                elapsed,
            });
        }

        tracing::trace!(target: "pagecheck", attempts, elapsed_ms = elapsed.as_millis() as u64, "condition not met, retrying");
        std::thread::sleep(interval.min(options.timeout - elapsed));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn options(timeout_ms: u64, interval_ms: u64) -> RetryOptions {
        RetryOptions::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    mod retry_options {
        use super::*;

        #[test]
        fn test_once() {
            let once = RetryOptions::once();
            assert_eq!(once.timeout, Duration::ZERO);
            assert!(!once.retries());
        }

        #[test]
        fn test_retries() {
            assert!(options(100, 10).retries());
        }
    }

    mod polling {
        use super::*;

        #[test]
        fn test_immediate_success_does_not_sleep() {
            let evaluation =
                evaluate_until(|| Ok(5), |v| *v == 5, options(5_000, 1_000)).unwrap();
            assert!(evaluation.success);
            assert_eq!(evaluation.attempts, 1);
            assert!(evaluation.elapsed < Duration::from_millis(500));
        }

        #[test]
        fn test_zero_timeout_is_single_attempt() {
            let calls = Cell::new(0);
            let evaluation = evaluate_until(
                || {
                    calls.set(calls.get() + 1);
                    Ok(1)
                },
                |v| *v == 2,
                RetryOptions::once(),
            )
            .unwrap();

            assert!(evaluation.is_failure());
            assert_eq!(calls.get(), 1);
            assert_eq!(evaluation.last_value, Some(1));
        }

        #[test]
        fn test_eventual_success() {
            let values = [None, Some(45), Some(57)];
            let calls = Cell::new(0);

            let evaluation = evaluate_until(
                || {
                    let value = values[calls.get().min(2)];
                    calls.set(calls.get() + 1);
                    Ok(value)
                },
                |v| *v == Some(57),
                options(1_000, 100),
            )
            .unwrap();

            assert!(evaluation.success);
            assert_eq!(evaluation.attempts, 3);
            assert!(evaluation.elapsed >= Duration::from_millis(200));
            assert!(evaluation.elapsed < Duration::from_secs(1));
        }

        #[test]
        fn test_timeout_returns_last_value() {
            let calls = Cell::new(0);
            let evaluation = evaluate_until(
                || {
                    calls.set(calls.get() + 1);
                    Ok(calls.get())
                },
                |_| false,
                options(100, 20),
            )
            .unwrap();

            assert!(evaluation.is_failure());
            assert!(evaluation.attempts > 1);
            assert_eq!(evaluation.last_value, Some(calls.get()));
            assert!(evaluation.elapsed >= Duration::from_millis(100));
        }

        #[test]
        fn test_zero_interval_is_raised_to_minimum() {
            let calls = Cell::new(0);
            let evaluation = evaluate_until(
                || {
                    calls.set(calls.get() + 1);
                    Ok(0)
                },
                |_| false,
                options(50, 0),
            )
            .unwrap();

            assert!(evaluation.is_failure());
            assert!(calls.get() >= 2);
            assert!(calls.get() <= 7);
        }

        #[test]
        fn test_sleep_is_capped_by_remaining_time() {
            let evaluation =
                evaluate_until(|| Ok(0), |_| false, options(50, 5_000)).unwrap();
            assert_eq!(evaluation.attempts, 2);
            assert!(evaluation.elapsed < Duration::from_secs(1));
        }
    }

    mod retrieval_errors {
        use super::*;

        #[test]
        fn test_transient_error_is_retried() {
            let calls = Cell::new(0);
            let evaluation = evaluate_until(
                || {
                    calls.set(calls.get() + 1);
                    if calls.get() < 3 {
                        Err(RetrievalError::unavailable("not rendered"))
                    } else {
                        Ok(true)
                    }
                },
                |v| *v,
                options(1_000, 10),
            )
            .unwrap();

            assert!(evaluation.success);
            assert_eq!(evaluation.attempts, 3);
            assert!(evaluation.last_error.is_none());
        }

        #[test]
        fn test_transient_error_surfaces_at_timeout() {
            let evaluation = evaluate_until(
                || Err::<i32, _>(RetrievalError::unavailable("element is detached")),
                |_| true,
                options(40, 10),
            )
            .unwrap();

            assert!(evaluation.is_failure());
            assert!(evaluation.last_value.is_none());
            assert_eq!(
                evaluation.last_error,
                Some(RetrievalError::unavailable("element is detached"))
            );
        }

        #[test]
        fn test_fatal_error_propagates_immediately() {
            let calls = Cell::new(0);
            let err = evaluate_until(
                || {
                    calls.set(calls.get() + 1);
                    Err::<i32, _>(RetrievalError::failed("session closed"))
                },
                |_| true,
                options(1_000, 10),
            )
            .unwrap_err();

            assert_eq!(err, RetrievalError::failed("session closed"));
            assert_eq!(calls.get(), 1);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_zero_timeout_evaluates_once(value in any::<i32>(), target in any::<i32>()) {
                let calls = Cell::new(0);
                let evaluation = evaluate_until(
                    || {
                        calls.set(calls.get() + 1);
                        Ok(value)
                    },
                    |v| *v == target,
                    RetryOptions::once(),
                )
                .unwrap();

                prop_assert_eq!(calls.get(), 1);
                prop_assert_eq!(evaluation.success, value == target);
            }
        }
    }
}
