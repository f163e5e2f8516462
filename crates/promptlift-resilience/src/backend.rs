//! Guarded backend decorator
//!
//! Wraps any [`LlmBackend`] with the retry policy and the session circuit
//! breaker. Call sites keep the plain `LlmBackend` interface; the decorator
//! owns the fail-fast pre-check, the backoff waits, and the success/failure
//! signals into the breaker.

use crate::{CircuitBreaker, RetryPolicy};
use async_trait::async_trait;
use promptlift_llm::{LlmBackend, LlmRequest, LlmResponse};
use promptlift_utils::LlmError;
use std::sync::Arc;
use tracing::{debug, warn};

/// An [`LlmBackend`] wrapped with retry and circuit-breaker protection.
pub struct GuardedBackend {
    inner: Arc<dyn LlmBackend>,
    breaker: Arc<CircuitBreaker>,
    policy: RetryPolicy,
}

impl GuardedBackend {
    #[must_use]
    pub fn new(inner: Arc<dyn LlmBackend>, breaker: Arc<CircuitBreaker>) -> Self {
        Self::with_policy(inner, breaker, RetryPolicy::default())
    }

    #[must_use]
    pub fn with_policy(
        inner: Arc<dyn LlmBackend>,
        breaker: Arc<CircuitBreaker>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            inner,
            breaker,
            policy,
        }
    }

    /// The breaker guarding this backend.
    #[must_use]
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

#[async_trait]
impl LlmBackend for GuardedBackend {
    async fn send(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        // Fail fast before any network attempt when the breaker is open.
        if self.breaker.is_open() {
            return Err(LlmError::BreakerOpen {
                remaining_secs: self.breaker.remaining_cooldown_secs(),
            });
        }

        let mut attempt: u32 = 0;
        loop {
            match self.inner.send(request.clone()).await {
                Ok(response) => {
                    self.breaker.record_success();
                    return Ok(response);
                }
                Err(error) => {
                    if !self.policy.should_retry(attempt, &error, &self.breaker) {
                        return Err(error);
                    }

                    let delay = self.policy.compute_delay(attempt, error.is_rate_limit());
                    warn!(
                        purpose = request.purpose,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying after transient failure"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                    debug!(purpose = request.purpose, attempt, "retry attempt");
                }
            }
        }
    }
}
