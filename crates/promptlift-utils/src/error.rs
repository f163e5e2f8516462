//! Error taxonomy for the promptlift pipeline
//!
//! The taxonomy follows the propagation policy of the failure design:
//! rate-limit-classified failures escalate and terminate the run, everything
//! else is absorbed at the most local layer that can handle it (retry,
//! fallback, or a recorded per-step error).

use promptlift_types::OrchestrationResult;
use std::time::Duration;
use thiserror::Error;

/// Transport-level errors from an LLM backend.
///
/// The classification matters more than the message: `RateLimited` and
/// `Overloaded` are the only retryable classes, and `BreakerOpen` is the
/// distinguished hard stop that must never enter fallback logic.
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP 429 or an explicit rate-limit signal from the provider
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// HTTP 503 or an explicit overload signal from the provider
    #[error("provider overloaded: {0}")]
    Overloaded(String),

    /// 401/403 from the provider; never retried
    #[error("provider authentication failed: {0}")]
    Auth(String),

    /// Network failure, unexpected status, or unparseable response body
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport-level timeout fired
    #[error("request timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// The session circuit breaker is open; carries the remaining cooldown.
    /// Always fatal to the current run and exempt from fallback.
    #[error("circuit breaker open; retry in {remaining_secs}s")]
    BreakerOpen { remaining_secs: u64 },

    /// Invalid backend configuration (missing key, bad URL, unknown provider)
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),
}

impl LlmError {
    /// Whether this error counts against the session-wide rate-limit tally.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Whether the retry policy may consider this error at all.
    /// Only rate-limit and overload classes qualify.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::Overloaded(_))
    }

    /// Whether this error must terminate the whole orchestration run:
    /// either the breaker is already open or the provider rejected the call
    /// for quota reasons.
    #[must_use]
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(self, Self::RateLimited(_) | Self::BreakerOpen { .. })
    }
}

/// Errors from the router layer.
///
/// The router absorbs most transport failures into the deterministic
/// fallback, so the only errors it surfaces are the ones that must not be
/// worked around.
#[derive(Error, Debug)]
pub enum RouterError {
    /// Breaker-open re-raised verbatim; bypasses fallback entirely
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Errors from the orchestration engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The run was aborted by a rate-limit or breaker-open condition.
    /// Carries everything built before the abort so the caller can still
    /// present partial output.
    #[error("orchestration aborted: {source}")]
    Aborted {
        /// Steps and results accumulated before the abort
        partial: Box<OrchestrationResult>,
        #[source]
        source: LlmError,
    },
}

impl EngineError {
    /// The partially-built result, regardless of variant.
    #[must_use]
    pub fn partial_result(&self) -> &OrchestrationResult {
        match self {
            Self::Aborted { partial, .. } => partial,
        }
    }

    /// Remaining breaker cooldown, when the abort was breaker-driven.
    #[must_use]
    pub fn remaining_cooldown_secs(&self) -> Option<u64> {
        match self {
            Self::Aborted {
                source: LlmError::BreakerOpen { remaining_secs },
                ..
            } => Some(*remaining_secs),
            Self::Aborted { .. } => None,
        }
    }
}

/// Top-level error type for library consumers.
#[derive(Error, Debug)]
pub enum LiftError {
    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),

    #[error("router error: {0}")]
    Router(#[from] RouterError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
