//! Bounded exponential-backoff retry policy.
//!
//! A [`RetryPolicy`] is a small value handed to whatever sits at a
//! storage boundary (the database gateway, the upload file store). The
//! caller supplies the classification of which errors are worth another
//! attempt; everything else is returned on the first failure.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry (then 4 s, 8 s).
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);

/// Default ceiling on a single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Retry up to `max_retries` times without sleeping in between.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Delay before retry number `retry` (1-based), clamped to `max_delay`.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1) as i32;
        let ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        let ms = if ms.is_finite() { ms.min(u64::MAX as f64) } else { u64::MAX as f64 };
        Duration::from_millis(ms as u64).min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails with an error `is_transient`
    /// rejects, or the retry budget is exhausted. The last error is
    /// returned on exhaustion.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        is_transient: impl Fn(&E) -> bool,
        mut op: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retry = 0u32;

        loop {
            match op().await {
                Ok(value) => {
                    if retry > 0 {
                        tracing::info!(operation, attempts = retry + 1, "Operation recovered after retry");
                    }
                    return Ok(value);
                }
                Err(e) if retry < self.max_retries && is_transient(&e) => {
                    retry += 1;
                    let delay = self.delay_for(retry);
                    tracing::warn!(
                        operation,
                        error = %e,
                        attempt = retry,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Transient failure, retrying",
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    if retry > 0 {
                        tracing::error!(
                            operation,
                            error = %e,
                            attempts = retry + 1,
                            "Operation failed after retries",
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}
