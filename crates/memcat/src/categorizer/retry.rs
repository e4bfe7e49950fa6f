//! Exponential backoff retry policy for backend calls
//!
//! The delay after attempt `n` (1-based) is
//! `min(base_delay * multiplier * 2^(n-1), max_delay)`. No delay follows the
//! final attempt, so total waiting is bounded by the sum of the delays for
//! attempts `1..max_attempts`.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::RetryConfig;

/// Retry policy for a fallible async operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    multiplier: u32,
}

/// The last error seen once every attempt has failed
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: E,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration, multiplier: u32) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            multiplier,
        }
    }

    /// Build a policy from config, with delays in seconds
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.base_delay_secs),
            Duration::from_secs(config.max_delay_secs),
            config.multiplier,
        )
    }

    /// Total attempts, never less than one
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let factor = self.multiplier.saturating_mul(1u32 << exponent);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Worst-case total time spent sleeping between attempts
    pub fn total_delay(&self) -> Duration {
        (1..self.max_attempts())
            .map(|attempt| self.delay_for_attempt(attempt))
            .sum()
    }

    /// Run `operation` until it succeeds or attempts run out.
    ///
    /// The closure receives the 1-based attempt number.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= max_attempts => {
                    return Err(RetryError {
                        attempts: attempt,
                        last,
                    });
                }
                Err(e) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        "Attempt {}/{} failed, retrying in {:?}: {}",
                        attempt, max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(8));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(15));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(15));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(15));
    }

    #[test]
    fn test_total_delay() {
        // Three attempts sleep twice: 4s + 8s
        assert_eq!(RetryPolicy::default().total_delay(), Duration::from_secs(12));

        let policy = RetryPolicy::new(5, Duration::from_secs(4), Duration::from_secs(15), 1);
        assert_eq!(policy.total_delay(), Duration::from_secs(4 + 8 + 15 + 15));
    }

    #[test]
    fn test_multiplier_scales_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(1), 3);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(300));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(600));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO, 1);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.total_delay(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<&str, RetryError<String>> = RetryPolicy::default()
            .run(|_| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("done")
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_retries_then_succeeds() {
        let start = Instant::now();

        let result: Result<u32, RetryError<String>> = RetryPolicy::default()
            .run(|attempt| async move {
                if attempt < 2 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4) && elapsed < Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exhausts_attempts() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result: Result<(), RetryError<String>> = RetryPolicy::default()
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure {attempt}")) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last, "failure 3");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(12) && elapsed < Duration::from_secs(13));
    }
}
