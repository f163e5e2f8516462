//! Core types for the LLM backend abstraction

use async_trait::async_trait;
use promptlift_utils::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-request timeout when the configuration does not set one.
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Input to one backend invocation.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// What the call is for, used in structured logging
    /// (`router`, `validate`, `improve`)
    pub purpose: &'static str,
    /// Ordered conversation messages
    pub messages: Vec<Message>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl LlmRequest {
    #[must_use]
    pub fn new(purpose: &'static str, messages: Vec<Message>) -> Self {
        Self {
            purpose,
            messages,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Output of one backend invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Raw response text
    pub text: String,
    /// Provider name (e.g. `anthropic`)
    pub provider: String,
    /// Model that produced the response
    pub model: String,
    /// Input tokens consumed, when the provider reports them
    pub tokens_input: Option<u64>,
    /// Output tokens generated, when the provider reports them
    pub tokens_output: Option<u64>,
}

impl LlmResponse {
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            provider: provider.into(),
            model: model.into(),
            tokens_input: None,
            tokens_output: None,
        }
    }
}

/// Trait for LLM backend implementations.
///
/// A backend performs exactly one network attempt per `send` and classifies
/// failures into [`LlmError`]; it never retries internally. Status codes must
/// be distinguishable at minimum for 429 and 503, which the retry policy
/// treats differently from everything else.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Send one prompt and return the raw response text.
    ///
    /// # Errors
    ///
    /// Returns a classified `LlmError` for any failure: auth, quota,
    /// overload, timeout, transport, or misconfiguration.
    async fn send(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_constructors() {
        let msg = Message::system("you are a router");
        assert_eq!(msg.role, Role::System);

        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn request_defaults_and_override() {
        let request = LlmRequest::new("router", vec![Message::user("x")]);
        assert_eq!(request.timeout, DEFAULT_REQUEST_TIMEOUT);

        let request = request.with_timeout(Duration::from_secs(5));
        assert_eq!(request.timeout, Duration::from_secs(5));
        assert_eq!(request.purpose, "router");
    }
}
