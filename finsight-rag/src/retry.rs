//! Bounded retry with exponential backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

/// A bounded retry policy: at most `max_attempts` tries, with an
/// unconditional sleep of `base_delay * 2^n` after the n-th failure
/// (n starting at 0).
///
/// The policy is plain data so callers can parameterize it per call and
/// tests can drive it under a paused clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries, including the first. Zero behaves like one.
    pub max_attempts: u32,
    /// Delay after the first failure; doubles on each further failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three attempts with 1s, then 2s between them.
    fn default() -> Self {
        Self { max_attempts: 3, base_delay: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    /// The delay slept after the (zero-based) `failure`-th failure.
    pub fn delay(&self, failure: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(failure))
    }

    /// Run `op` until it succeeds or the attempt budget is exhausted,
    /// returning the last error. Sleeps between attempts, never after
    /// the final one.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut failures = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    failures += 1;
                    if failures >= self.max_attempts {
                        return Err(err);
                    }
                    let delay = self.delay(failures - 1);
                    warn!(attempt = failures, error = %err, ?delay, "attempt failed, backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}
