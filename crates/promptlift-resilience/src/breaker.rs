//! Session-wide circuit breaker
//!
//! The breaker counts rate-limit failures across every call in the process,
//! not per endpoint: the cost problem it guards against is total API volume,
//! so a 429 on a validation call and a 429 on a router call advance the same
//! tally. On the third cumulative failure the breaker opens and every caller
//! fails fast until the cooldown elapses.

use promptlift_utils::LlmError;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Rate-limit failures tolerated before the breaker opens.
const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Cooldown window, measured from the last recorded failure.
const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct BreakerState {
    total_retries: u32,
    last_failure: Option<Instant>,
    is_open: bool,
}

/// Process-wide breaker guarding all LLM calls in a session.
///
/// State is in-memory only and never persisted across restarts. Callers
/// share one instance per session (typically behind an `Arc`).
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::with_settings(DEFAULT_FAILURE_THRESHOLD, DEFAULT_COOLDOWN)
    }
}

impl CircuitBreaker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Breaker with non-default threshold and cooldown, for tests and
    /// embedders with different quota contracts.
    #[must_use]
    pub fn with_settings(failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            failure_threshold,
            cooldown,
        }
    }

    /// Whether the breaker is currently open.
    ///
    /// An open breaker whose cooldown has elapsed resets itself to closed
    /// (counters cleared) before answering.
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();
        if !state.is_open {
            return false;
        }

        let elapsed = state
            .last_failure
            .map_or(self.cooldown, |at| at.elapsed());
        if elapsed >= self.cooldown {
            info!("circuit breaker cooldown elapsed, resetting to closed");
            *state = BreakerState::default();
            false
        } else {
            true
        }
    }

    /// Record a failure. Only rate-limit errors advance the tally; reaching
    /// the threshold opens the breaker and stamps the failure time.
    pub fn record_failure(&self, error: &LlmError) {
        if !error.is_rate_limit() {
            return;
        }

        let mut state = self.lock();
        state.total_retries += 1;
        state.last_failure = Some(Instant::now());

        if state.total_retries >= self.failure_threshold && !state.is_open {
            state.is_open = true;
            warn!(
                total_retries = state.total_retries,
                cooldown_secs = self.cooldown.as_secs(),
                "circuit breaker opened"
            );
        }
    }

    /// Clear the failure tally after a successful call.
    ///
    /// Has no effect while the breaker is open; only the cooldown closes an
    /// open breaker.
    pub fn record_success(&self) {
        let mut state = self.lock();
        if !state.is_open {
            state.total_retries = 0;
        }
    }

    /// Whether the cumulative tally still permits another retry.
    pub fn can_retry(&self) -> bool {
        self.lock().total_retries < self.failure_threshold
    }

    /// Seconds left in the cooldown window, zero when closed or elapsed.
    /// Rounded up, so an open breaker never reports a zero countdown.
    pub fn remaining_cooldown_secs(&self) -> u64 {
        let state = self.lock();
        if !state.is_open {
            return 0;
        }
        let elapsed = state
            .last_failure
            .map_or(self.cooldown, |at| at.elapsed());
        let remaining = self.cooldown.saturating_sub(elapsed);
        remaining.as_millis().div_ceil(1000) as u64
    }

    /// Force the breaker back to its initial state.
    pub fn reset(&self) {
        *self.lock() = BreakerState::default();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        // A poisoned lock means a panic mid-update; the state is a few
        // integers, safe to keep using.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limit() -> LlmError {
        LlmError::RateLimited("429".into())
    }

    #[test]
    fn starts_closed() {
        let breaker = CircuitBreaker::new();
        assert!(!breaker.is_open());
        assert!(breaker.can_retry());
        assert_eq!(breaker.remaining_cooldown_secs(), 0);
    }

    #[test]
    fn opens_on_third_rate_limit_failure() {
        let breaker = CircuitBreaker::new();

        breaker.record_failure(&rate_limit());
        breaker.record_failure(&rate_limit());
        assert!(!breaker.is_open());
        assert!(breaker.can_retry());

        breaker.record_failure(&rate_limit());
        assert!(breaker.is_open());
        assert!(!breaker.can_retry());
        assert!(breaker.remaining_cooldown_secs() > 0);
    }

    #[test]
    fn non_rate_limit_failures_do_not_count() {
        let breaker = CircuitBreaker::new();

        for _ in 0..5 {
            breaker.record_failure(&LlmError::Overloaded("503".into()));
            breaker.record_failure(&LlmError::Transport("reset".into()));
        }

        assert!(!breaker.is_open());
        assert!(breaker.can_retry());
    }

    #[test]
    fn failures_accumulate_across_call_types() {
        // Same tally regardless of which logical call observed the 429
        let breaker = CircuitBreaker::new();

        breaker.record_failure(&rate_limit()); // router call
        breaker.record_failure(&rate_limit()); // validation call
        breaker.record_failure(&rate_limit()); // improvement call

        assert!(breaker.is_open());
    }

    #[test]
    fn success_clears_tally_while_closed() {
        let breaker = CircuitBreaker::new();

        breaker.record_failure(&rate_limit());
        breaker.record_failure(&rate_limit());
        breaker.record_success();

        // Tally cleared, so two more failures still leave it closed
        breaker.record_failure(&rate_limit());
        breaker.record_failure(&rate_limit());
        assert!(!breaker.is_open());
    }

    #[test]
    fn success_does_not_close_an_open_breaker() {
        let breaker = CircuitBreaker::new();

        for _ in 0..3 {
            breaker.record_failure(&rate_limit());
        }
        assert!(breaker.is_open());

        breaker.record_success();
        assert!(breaker.is_open());
        assert!(!breaker.can_retry());
    }

    #[test]
    fn cooldown_elapse_resets_to_closed() {
        let breaker = CircuitBreaker::with_settings(3, Duration::from_millis(10));

        for _ in 0..3 {
            breaker.record_failure(&rate_limit());
        }
        assert!(breaker.is_open());

        std::thread::sleep(Duration::from_millis(20));
        assert!(!breaker.is_open());
        assert!(breaker.can_retry());
        assert_eq!(breaker.remaining_cooldown_secs(), 0);
    }

    #[test]
    fn remaining_cooldown_rounds_up_while_open() {
        let breaker = CircuitBreaker::with_settings(3, Duration::from_secs(100));
        for _ in 0..3 {
            breaker.record_failure(&rate_limit());
        }

        // Microseconds have elapsed since the last failure, so truncation
        // would already report 99; the countdown must round up instead.
        assert_eq!(breaker.remaining_cooldown_secs(), 100);
    }

    #[test]
    fn sub_second_remainder_reports_nonzero_while_open() {
        let breaker = CircuitBreaker::with_settings(3, Duration::from_millis(900));
        for _ in 0..3 {
            breaker.record_failure(&rate_limit());
        }

        assert!(breaker.is_open());
        assert_eq!(breaker.remaining_cooldown_secs(), 1);
    }

    #[test]
    fn manual_reset_restores_initial_state() {
        let breaker = CircuitBreaker::new();

        for _ in 0..3 {
            breaker.record_failure(&rate_limit());
        }
        breaker.reset();

        assert!(!breaker.is_open());
        assert!(breaker.can_retry());
    }
}
