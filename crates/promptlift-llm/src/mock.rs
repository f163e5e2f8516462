//! Scripted mock backend for tests
//!
//! Responses are queued ahead of time and popped in order, one per `send`.
//! Requests are recorded so tests can assert on prompt content and call
//! counts.

use crate::types::{LlmBackend, LlmRequest, LlmResponse};
use async_trait::async_trait;
use promptlift_utils::LlmError;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Backend that replays a scripted sequence of results.
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful text response.
    pub fn push_text(&self, text: impl Into<String>) {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(Ok(LlmResponse::new(text, "mock", "mock-model")));
    }

    /// Queue a failure.
    pub fn push_error(&self, error: LlmError) {
        self.script
            .lock()
            .expect("mock script lock")
            .push_back(Err(error));
    }

    /// Number of `send` calls observed so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("mock requests lock").len()
    }

    /// Recorded requests, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().expect("mock requests lock").clone()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    async fn send(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests
            .lock()
            .expect("mock requests lock")
            .push(request);

        self.script
            .lock()
            .expect("mock script lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Transport(
                    "mock script exhausted: no response queued for this call".to_string(),
                ))
            })
    }
}
