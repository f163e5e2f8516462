//! Anthropic Messages API backend
//!
//! HTTP backend for Anthropic's native Messages API. System messages are
//! lifted into the API's `system` field; user and assistant messages go into
//! the `messages` array in order.

use crate::http::HttpClient;
use crate::types::{LlmBackend, LlmRequest, LlmResponse, Message, Role, DEFAULT_REQUEST_TIMEOUT};
use async_trait::async_trait;
use promptlift_config::Config;
use promptlift_utils::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Anthropic Messages API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic backend state.
#[derive(Clone)]
pub(crate) struct AnthropicBackend {
    client: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl AnthropicBackend {
    /// Create a backend from the `[llm.anthropic]` table.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Misconfiguration` if:
    /// - The API key environment variable is not set
    /// - No model is configured
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, LlmError> {
        let anthropic = config.llm.anthropic.as_ref();

        let api_key_env = anthropic
            .and_then(|a| a.api_key_env.as_deref())
            .unwrap_or("ANTHROPIC_API_KEY");

        let api_key = std::env::var(api_key_env).map_err(|_| {
            LlmError::Misconfiguration(format!(
                "Anthropic API key not found in environment variable '{api_key_env}'. \
                 Set this variable or configure a different api_key_env in [llm.anthropic]."
            ))
        })?;

        let model = anthropic.and_then(|a| a.model.clone()).ok_or_else(|| {
            LlmError::Misconfiguration(
                "Anthropic model not specified in configuration. \
                 Set [llm.anthropic] model = \"model-name\"."
                    .to_string(),
            )
        })?;

        Ok(Self {
            client: HttpClient::shared()?,
            base_url: anthropic
                .and_then(|a| a.base_url.clone())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model,
            max_tokens: anthropic.and_then(|a| a.max_tokens).unwrap_or(2048),
            temperature: anthropic.and_then(|a| a.temperature).unwrap_or(0.2),
            timeout: anthropic
                .and_then(|a| a.timeout_secs)
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
        })
    }

    /// Split messages into Anthropic's `system` field and `messages` array.
    ///
    /// Multiple system messages are concatenated with blank lines.
    fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
        let mut system_prompt: Option<String> = None;
        let mut anthropic_messages = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => {
                    if let Some(existing) = system_prompt.as_mut() {
                        existing.push_str("\n\n");
                        existing.push_str(&msg.content);
                    } else {
                        system_prompt = Some(msg.content.clone());
                    }
                }
                Role::User => anthropic_messages.push(AnthropicMessage {
                    role: "user".to_string(),
                    content: msg.content.clone(),
                }),
                Role::Assistant => anthropic_messages.push(AnthropicMessage {
                    role: "assistant".to_string(),
                    content: msg.content.clone(),
                }),
            }
        }

        (system_prompt, anthropic_messages)
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    async fn send(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let timeout = if request.timeout == DEFAULT_REQUEST_TIMEOUT {
            self.timeout
        } else {
            request.timeout
        };

        debug!(
            provider = "anthropic",
            model = %self.model,
            purpose = request.purpose,
            timeout_secs = timeout.as_secs(),
            "sending request"
        );

        let (system_prompt, anthropic_messages) = Self::convert_messages(&request.messages);

        let body = AnthropicRequest {
            model: self.model.clone(),
            messages: anthropic_messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: system_prompt,
        };

        let http_request = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let response = self
            .client
            .execute(http_request, timeout, "anthropic")
            .await?;

        let body: AnthropicResponse = response.json().await.map_err(|e| {
            LlmError::Transport(format!("failed to parse Anthropic response: {e}"))
        })?;

        let text: String = body
            .content
            .iter()
            .filter(|block| block.content_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if text.is_empty() {
            return Err(LlmError::Transport(
                "Anthropic response missing text content".to_string(),
            ));
        }

        let mut result = LlmResponse::new(text, "anthropic", self.model.clone());
        if let Some(usage) = body.usage {
            result.tokens_input = Some(usage.input_tokens);
            result.tokens_output = Some(usage.output_tokens);
        }

        debug!(
            provider = "anthropic",
            purpose = request.purpose,
            tokens_input = ?result.tokens_input,
            tokens_output = ?result.tokens_output,
            "request completed"
        );

        Ok(result)
    }
}

/// Message in Anthropic request format.
#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

/// Anthropic request body.
#[derive(Debug, Clone, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

/// Anthropic response body.
#[derive(Debug, Clone, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

/// Content block in an Anthropic response.
#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

/// Token usage report.
#[derive(Debug, Clone, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}
