//! Bounded retry driver with pluggable backoff strategies.
//!
//! This helper is offered to callers - it is deliberately **not** wired into
//! [`crate::cache::Cache`] or [`crate::secret::resolver::Resolver`]. The caching layer
//! must see the loader's real error to decide not to cache it; if retry were installed
//! underneath it transparently, every cache miss would silently become several backend
//! calls and the "loader error is not cached" contract would be harder to reason about.
//! Wrap your own `Provider::get_secret_value` call site in [`retry`] instead.

use crate::error::{Error, Result};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A backoff strategy: produces the delay before the next attempt, or signals
/// exhaustion with `None`.
///
/// Implementations are shared-state and internally synchronized, so a single instance
/// may be driven by concurrent [`retry`] calls and still produce one monotone sequence.
pub trait Backoff: Send + Sync {
    /// Return the delay before the next attempt, or `None` if attempts are exhausted.
    fn next(&self) -> Option<Duration>;
}

/// Squares the previous delay on every attempt: `base`, `base², base⁴, …`.
///
/// This is a literal "square the previous delay" schedule, not the more common
/// `base · 2ⁿ` geometric schedule - preserved as documented rather than "fixed",
/// per this crate's design notes.
pub struct Exponential {
    max_attempts: u32,
    state: Mutex<ExponentialState>,
}

struct ExponentialState {
    previous: Duration,
    attempt: u32,
}

impl Exponential {
    /// `base` is both the seed value and (after squaring) the first returned delay.
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Exponential {
            max_attempts,
            state: Mutex::new(ExponentialState {
                previous: base,
                attempt: 0,
            }),
        }
    }
}

impl Backoff for Exponential {
    fn next(&self) -> Option<Duration> {
        let mut state = self.state.lock().unwrap();
        if state.attempt >= self.max_attempts {
            return None;
        }
        state.attempt += 1;
        let squared = state.previous.as_secs_f64().powi(2);
        let next = Duration::from_secs_f64(squared);
        state.previous = next;
        Some(next)
    }
}

/// Fibonacci-shaped backoff: `base, base, 2·base, 3·base, 5·base, …`.
pub struct Fibonacci {
    max_attempts: u32,
    state: Mutex<FibonacciState>,
}

struct FibonacciState {
    p1: Duration,
    p2: Duration,
    attempt: u32,
}

impl Fibonacci {
    pub fn new(base: Duration, max_attempts: u32) -> Self {
        Fibonacci {
            max_attempts,
            state: Mutex::new(FibonacciState {
                p1: Duration::ZERO,
                p2: base,
                attempt: 0,
            }),
        }
    }
}

impl Backoff for Fibonacci {
    fn next(&self) -> Option<Duration> {
        let mut state = self.state.lock().unwrap();
        if state.attempt >= self.max_attempts {
            return None;
        }
        state.attempt += 1;
        // Emit the current p2 *before* rotating: emitting p1+p2 here instead would
        // skip the repeated leading delay and produce 1, 2, 3, 5 instead of the
        // documented 1, 1, 2, 3, 5 for base=1.
        let delay = state.p2;
        let next_p2 = state.p1 + state.p2;
        state.p1 = state.p2;
        state.p2 = next_p2;
        Some(delay)
    }
}

/// Run `f`, consulting `backoff` for the delay after a [`Error::is_retryable`] error.
/// Returns immediately on a non-retryable error, on backoff exhaustion, or on
/// cancellation via `cancel`.
pub async fn retry<F, Fut, T>(cancel: &CancellationToken, backoff: &dyn Backoff, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Canceled);
        }
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retryable() {
                    return Err(err);
                }
                match backoff.next() {
                    Some(delay) => {
                        tokio::select! {
                            _ = cancel.cancelled() => return Err(Error::Canceled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                    None => return Err(err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_exponential_squares_previous() {
        let backoff = Exponential::new(Duration::from_secs(2), 10);
        assert_eq!(backoff.next(), Some(Duration::from_secs(4)));
        assert_eq!(backoff.next(), Some(Duration::from_secs(16)));
        assert_eq!(backoff.next(), Some(Duration::from_secs(256)));
    }

    #[test]
    fn test_exponential_exhausts_after_max_attempts() {
        let backoff = Exponential::new(Duration::from_millis(10), 2);
        assert!(backoff.next().is_some());
        assert!(backoff.next().is_some());
        assert_eq!(backoff.next(), None);
    }

    #[test]
    fn test_fibonacci_sequence_from_base_one() {
        let backoff = Fibonacci::new(Duration::from_secs(1), 10);
        let expected = [1u64, 1, 2, 3, 5, 8];
        for want in expected {
            assert_eq!(backoff.next(), Some(Duration::from_secs(want)));
        }
    }

    #[test]
    fn test_max_attempts_zero_means_no_delay_offered() {
        let backoff = Exponential::new(Duration::from_secs(1), 0);
        assert_eq!(backoff.next(), None);

        let fib = Fibonacci::new(Duration::from_secs(1), 0);
        assert_eq!(fib.next(), None);
    }

    #[tokio::test]
    async fn test_retry_calls_once_on_terminal_error() {
        let calls = AtomicU32::new(0);
        let backoff = Exponential::new(Duration::from_millis(1), 5);
        let cancel = CancellationToken::new();
        let result: Result<()> = retry(&cancel, &backoff, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::MalformedReference("nope".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_exhausts_with_max_attempts_zero() {
        let calls = AtomicU32::new(0);
        let backoff = Exponential::new(Duration::from_millis(1), 0);
        let cancel = CancellationToken::new();
        let result: Result<()> = retry(&cancel, &backoff, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Other("flaky".to_string()).retryable())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_retryable_failures() {
        let attempt = Arc::new(AtomicU32::new(0));
        let backoff = Exponential::new(Duration::from_millis(1), 5);
        let cancel = CancellationToken::new();
        let attempt_clone = attempt.clone();
        let result = retry(&cancel, &backoff, move || {
            let attempt = attempt_clone.clone();
            async move {
                let n = attempt.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(Error::Other("flaky".to_string()).retryable())
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(result, 2);
        assert_eq!(attempt.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_honors_cancellation() {
        let backoff = Exponential::new(Duration::from_secs(60), 5);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<()> = retry(&cancel, &backoff, || async {
            Err(Error::Other("flaky".to_string()).retryable())
        })
        .await;
        assert!(matches!(result, Err(Error::Canceled)));
    }
}
