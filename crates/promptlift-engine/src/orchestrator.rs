//! The orchestration loop
//!
//! One run drives the router/executor cycle until the router says `done`,
//! the iteration cap fires, or a quota failure aborts the session. The
//! breaker is checked before every iteration; extraction steps never issue
//! their own LLM call because the router's decision already carries their
//! payload.

use crate::context::{context_summary, ContextSink, RunHandoff};
use crate::executor::{generate_improved_prompt, validate_prompt_quality};
use promptlift_llm::LlmBackend;
use promptlift_resilience::CircuitBreaker;
use promptlift_router::Router;
use promptlift_types::{Action, OrchestrationResult, OrchestrationStep};
use promptlift_utils::{EngineError, LlmError, RouterError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hard iteration cap; reaching it is a soft-done, not an error.
pub const DEFAULT_MAX_STEPS: usize = 15;

/// Per-step progress callback, for live feedback while a run executes.
pub type StepCallback = dyn Fn(&OrchestrationStep) + Send + Sync;

/// Top-level control loop over a guarded backend.
pub struct Orchestrator {
    backend: Arc<dyn LlmBackend>,
    router: Router,
    breaker: Arc<CircuitBreaker>,
    sink: Option<Arc<dyn ContextSink>>,
    max_steps: usize,
}

impl Orchestrator {
    /// Build an orchestrator over a backend and the session breaker.
    ///
    /// The backend should already be wrapped with retry and breaker
    /// protection; the orchestrator only reads the breaker for its
    /// per-iteration pre-check.
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            router: Router::new(backend.clone()),
            backend,
            breaker,
            sink: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn with_context_sink(mut self, sink: Arc<dyn ContextSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run the full pipeline over one prompt.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Aborted` on a quota failure (rate limit or open
    /// breaker); the partially-built result travels inside the error. Every
    /// other failure is recorded per step and the run completes.
    pub async fn orchestrate(
        &self,
        prompt: &str,
        on_step: Option<&StepCallback>,
    ) -> Result<OrchestrationResult, EngineError> {
        let mut result = OrchestrationResult::default();
        let mut completed: Vec<Action> = Vec::new();
        let mut fragments: BTreeMap<String, serde_json::Value> = BTreeMap::new();

        for iteration in 0..self.max_steps {
            // Pre-check: never attempt another router call once the session
            // is rejected for quota reasons.
            if self.breaker.is_open() {
                let remaining_secs = self.breaker.remaining_cooldown_secs();
                warn!(iteration, remaining_secs, "circuit breaker open, aborting run");
                return Err(self.abort(
                    result,
                    fragments,
                    prompt,
                    LlmError::BreakerOpen { remaining_secs },
                ));
            }

            let decision = match self.router.route(prompt, &completed).await {
                Ok(decision) => decision,
                Err(RouterError::Llm(err)) => {
                    warn!(iteration, error = %err, "router raised hard stop");
                    return Err(self.abort(result, fragments, prompt, err));
                }
            };
            let action = decision.next_action;
            debug!(iteration, action = action.as_str(), "router decided");

            if action.is_terminal() {
                let step = OrchestrationStep::succeeded(action, decision, None);
                push_and_notify(&mut result, on_step, step);
                info!(iteration, "run complete");
                break;
            }

            let outcome = self
                .execute(action, &decision.extracted_data, prompt, &fragments)
                .await;

            match outcome {
                Ok(StepOutput { payload, validation, improvement }) => {
                    if let Some(report) = validation {
                        result.validation = Some(report);
                    }
                    if let Some(suggestion) = improvement {
                        result.improvement = Some(suggestion);
                    }
                    if action.is_extraction() {
                        if let Some(data) = payload.clone() {
                            fragments.insert(action.as_str().to_string(), data);
                        }
                    }

                    let step = OrchestrationStep::succeeded(action, decision, payload);
                    completed.push(action);
                    push_and_notify(&mut result, on_step, step);
                }
                Err(err) if err.is_fatal_to_run() => {
                    // Once the API rejects a call for quota reasons, every
                    // subsequent action is assumed doomed.
                    let step = OrchestrationStep::failed(action, decision, err.to_string());
                    result.errors.push(err.to_string());
                    push_and_notify(&mut result, on_step, step);
                    warn!(iteration, error = %err, "quota failure, aborting run");
                    return Err(self.abort(result, fragments, prompt, err));
                }
                Err(err) => {
                    // Locally recoverable; record and move on. The action
                    // stays eligible for a later iteration.
                    let step = OrchestrationStep::failed(action, decision, err.to_string());
                    result.errors.push(err.to_string());
                    push_and_notify(&mut result, on_step, step);
                    info!(iteration, error = %err, "step failed, continuing");
                }
            }
        }

        self.finalize(&mut result, fragments, prompt);
        Ok(result)
    }

    /// Dispatch one non-terminal action.
    async fn execute(
        &self,
        action: Action,
        extracted_data: &Option<serde_json::Value>,
        prompt: &str,
        fragments: &BTreeMap<String, serde_json::Value>,
    ) -> Result<StepOutput, LlmError> {
        match action {
            Action::Validate => {
                let report = validate_prompt_quality(&self.backend, prompt).await?;
                Ok(StepOutput {
                    payload: serde_json::to_value(&report).ok(),
                    validation: Some(report),
                    improvement: None,
                })
            }
            Action::GenerateImprovement => {
                let summary = context_summary(fragments);
                let suggestion =
                    generate_improved_prompt(&self.backend, prompt, &summary).await?;
                Ok(StepOutput {
                    payload: serde_json::to_value(&suggestion).ok(),
                    validation: None,
                    improvement: Some(suggestion),
                })
            }
            // The decision already carries the extraction result; no
            // additional LLM call is ever issued for extract* actions.
            _ => Ok(StepOutput {
                payload: extracted_data.clone(),
                validation: None,
                improvement: None,
            }),
        }
    }

    /// Merge fragments, stamp the step count, and hand the run off.
    fn finalize(
        &self,
        result: &mut OrchestrationResult,
        fragments: BTreeMap<String, serde_json::Value>,
        prompt: &str,
    ) {
        if !fragments.is_empty() {
            result.extracted_context = Some(fragments);
        }
        result.total_steps = result.steps.len();

        if let Some(sink) = &self.sink {
            let empty = BTreeMap::new();
            sink.store(&RunHandoff {
                prompt,
                context: result.extracted_context.as_ref().unwrap_or(&empty),
                validation: result.validation.as_ref(),
                steps: &result.steps,
            });
        }
    }

    /// Finalize the partial result and wrap it in the abort error, so the
    /// caller can still present everything built before the hard stop.
    fn abort(
        &self,
        mut result: OrchestrationResult,
        fragments: BTreeMap<String, serde_json::Value>,
        prompt: &str,
        source: LlmError,
    ) -> EngineError {
        self.finalize(&mut result, fragments, prompt);
        EngineError::Aborted {
            partial: Box::new(result),
            source,
        }
    }
}

struct StepOutput {
    payload: Option<serde_json::Value>,
    validation: Option<promptlift_types::ValidationReport>,
    improvement: Option<promptlift_types::ImprovementSuggestion>,
}

/// Append the step to the trail, then fire the callback with the appended
/// record. The callback contract is "after each step is appended".
fn push_and_notify(
    result: &mut OrchestrationResult,
    on_step: Option<&StepCallback>,
    step: OrchestrationStep,
) {
    result.steps.push(step);
    if let (Some(callback), Some(appended)) = (on_step, result.steps.last()) {
        callback(appended);
    }
}
