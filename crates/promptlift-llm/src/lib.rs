//! LLM transport abstraction for promptlift
//!
//! Backends implement the [`LlmBackend`] trait; callers never see provider
//! details beyond the classified [`LlmError`] they surface. The transport is
//! deliberately dumb: it performs exactly one network attempt per `send` and
//! maps status codes into the error taxonomy. Retry, backoff, and the
//! circuit breaker live one layer up in `promptlift-resilience`.

mod anthropic;
mod http;
mod types;

#[cfg(any(test, feature = "test-utils"))]
mod mock;

pub use promptlift_utils::LlmError;
pub use types::{LlmBackend, LlmRequest, LlmResponse, Message, Role};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockBackend;

pub(crate) use anthropic::AnthropicBackend;

use promptlift_config::Config;
use std::sync::Arc;

/// Construct the configured provider backend.
///
/// The returned backend is unguarded; production callers wrap it in the
/// resilience decorator before use.
///
/// # Errors
///
/// Returns `LlmError::Misconfiguration` for an unknown provider or an
/// invalid provider table (missing model, missing API key variable).
pub fn from_config(config: &Config) -> Result<Arc<dyn LlmBackend>, LlmError> {
    match config.provider() {
        "anthropic" => {
            let backend = AnthropicBackend::new_from_config(config)?;
            Ok(Arc::new(backend))
        }
        unknown => Err(LlmError::Misconfiguration(format!(
            "unknown LLM provider '{unknown}'; supported providers: anthropic"
        ))),
    }
}
