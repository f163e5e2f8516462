//! Retry policy for transient LLM failures
//!
//! Two error classes are retryable: rate-limit (429) and overload (503).
//! Everything else propagates immediately. Backoff is exponential with
//! uniform jitter, capped at 30 seconds, with a slower base for rate-limit
//! errors than for overload.

use crate::CircuitBreaker;
use promptlift_utils::LlmError;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

/// Hard cap on any single backoff wait.
const MAX_DELAY_MS: u64 = 30_000;

/// Jitter range as a fraction of the exponential delay.
const JITTER_FRACTION: f64 = 0.2;

/// Policy for retrying a failed LLM call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry attempts permitted per logical call
    pub max_retries: u32,
    /// Base delay for rate-limit errors
    pub rate_limit_base: Duration,
    /// Base delay for overload errors
    pub overload_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            rate_limit_base: Duration::from_millis(2000),
            overload_base: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a failed attempt should be retried.
    ///
    /// Rate-limit failures are recorded into the breaker before the decision
    /// is made, so the session-wide tally advances exactly once per observed
    /// 429 regardless of the outcome. An open breaker, or a tally at the
    /// threshold, vetoes the retry no matter how many attempts remain.
    pub fn should_retry(&self, attempt: u32, error: &LlmError, breaker: &CircuitBreaker) -> bool {
        if !error.is_retryable() {
            return false;
        }

        if error.is_rate_limit() {
            breaker.record_failure(error);
            if breaker.is_open() || !breaker.can_retry() {
                debug!(attempt, "retry vetoed by circuit breaker");
                return false;
            }
        }

        attempt < self.max_retries
    }

    /// Backoff delay for the given attempt:
    /// `min(2^attempt * base + jitter, 30s)` with jitter drawn uniformly
    /// from ±20% of the exponential delay.
    #[must_use]
    pub fn compute_delay(&self, attempt: u32, is_rate_limit: bool) -> Duration {
        let base = if is_rate_limit {
            self.rate_limit_base
        } else {
            self.overload_base
        };

        let exponential = base.as_millis() as f64 * f64::from(2_u32.saturating_pow(attempt));
        let jitter = rand::thread_rng()
            .gen_range(-JITTER_FRACTION..=JITTER_FRACTION)
            * exponential;
        let delay_ms = (exponential + jitter).min(MAX_DELAY_MS as f64).max(0.0);

        Duration::from_millis(delay_ms as u64)
    }
}
