//! Retry Engine — bounded retry with exponential backoff.
//!
//! The engine owns the attempt loop and the waits. Whether a failure is worth
//! another attempt is decided by the policy's retry predicate (usually
//! `classifier::is_retryable`); a rejected error ends the loop immediately.
//!
//! Waits are `tokio::time::sleep` suspensions, so other tasks keep running
//! while a request backs off.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

type Observer<'a, E> = Box<dyn Fn(u32, &E) + Send + Sync + 'a>;
type Predicate<'a, E> = Box<dyn Fn(&E) -> bool + Send + Sync + 'a>;

/// Immutable retry configuration for a single call.
///
/// The multiplier is fixed at 2: the wait before attempt `k + 1` is
/// `base_delay × 2^(k-1)`.
pub struct RetryPolicy<'a, E> {
    max_attempts: u32,
    base_delay: Duration,
    observer: Option<Observer<'a, E>>,
    retry_if: Option<Predicate<'a, E>>,
}

impl<'a, E> RetryPolicy<'a, E> {
    /// A `max_attempts` of zero is treated as one attempt.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        debug_assert!(!base_delay.is_zero(), "base_delay must be positive");
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            observer: None,
            retry_if: None,
        }
    }

    /// Called with the failed attempt number and its error, before the wait.
    pub fn on_retry(mut self, observer: impl Fn(u32, &E) + Send + Sync + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Errors for which `predicate` returns false are not retried.
    pub fn retry_if(mut self, predicate: impl Fn(&E) -> bool + Send + Sync + 'a) -> Self {
        self.retry_if = Some(Box::new(predicate));
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Wait inserted after the failed `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = attempt
            .checked_sub(1)
            .and_then(|exp| 1u32.checked_shl(exp))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    fn should_retry(&self, error: &E) -> bool {
        self.retry_if.as_ref().map_or(true, |predicate| predicate(error))
    }

    fn notify(&self, attempt: u32, error: &E) {
        if let Some(observer) = &self.observer {
            observer(attempt, error);
        }
    }
}

/// Runs `operation` until it succeeds, the policy rejects the error, or the
/// attempts run out. Failure always carries the last observed error.
pub async fn execute<T, E, F, Fut>(policy: &RetryPolicy<'_, E>, mut operation: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if attempt >= policy.max_attempts {
            warn!(
                "Giving up after {} attempt(s): {}",
                policy.max_attempts, error
            );
            return Err(error);
        }

        if !policy.should_retry(&error) {
            debug!("Attempt {} failed with a permanent error: {}", attempt, error);
            return Err(error);
        }

        let delay = policy.delay_after(attempt);
        policy.notify(attempt, &error);
        warn!(
            "Attempt {}/{} failed, retrying after {}ms: {}",
            attempt,
            policy.max_attempts,
            delay.as_millis(),
            error
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
