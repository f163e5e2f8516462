//! The sequential router
//!
//! One LLM call per step returns both the next action and, for extraction
//! actions, the extracted payload inline. The router validates the model's
//! answer before handing it back: duplicate actions and low-confidence
//! choices are substituted, unusable responses drop into the deterministic
//! fallback. The single thing it never works around is an open circuit
//! breaker, which is re-raised untouched.

use crate::fallback::fallback_decision;
use crate::parse::parse_decision;
use crate::prompt::{render_router_prompt, system_prompt};
use promptlift_llm::{LlmBackend, LlmRequest, Message};
use promptlift_types::{Action, RouterDecision};
use promptlift_utils::{LlmError, RouterError};
use std::sync::Arc;
use tracing::{debug, info};

/// Router over an LLM backend.
///
/// The backend is expected to already be wrapped with retry and breaker
/// protection; the router sees only the final classified error of a call.
pub struct Router {
    backend: Arc<dyn LlmBackend>,
}

impl Router {
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Decide the next action for the given prompt and history.
    ///
    /// # Errors
    ///
    /// Only `LlmError::BreakerOpen` surfaces as an error; every other
    /// failure is absorbed into the deterministic fallback.
    pub async fn route(
        &self,
        prompt: &str,
        completed: &[Action],
    ) -> Result<RouterDecision, RouterError> {
        let request = LlmRequest::new(
            "router",
            vec![
                Message::system(system_prompt()),
                Message::user(render_router_prompt(prompt, completed)),
            ],
        );

        let response = match self.backend.send(request).await {
            Ok(response) => response,
            Err(err @ LlmError::BreakerOpen { .. }) => {
                // A hard stop, never a "try something else" situation
                return Err(err.into());
            }
            Err(err) => {
                info!(error = %err, "router call failed, using fallback heuristic");
                return Ok(fallback_decision(completed, &err.to_string()));
            }
        };

        let Some(decision) = parse_decision(&response.text) else {
            info!("router response unusable, using fallback heuristic");
            return Ok(fallback_decision(completed, "unusable router response"));
        };

        Ok(self.apply_guards(decision, completed))
    }

    /// Duplicate-action and confidence guards, in that order.
    fn apply_guards(&self, decision: RouterDecision, completed: &[Action]) -> RouterDecision {
        if completed.contains(&decision.next_action) {
            let proposed = decision.next_action;
            return match usable_fallback(&decision, completed) {
                Some(fallback) => {
                    debug!(
                        proposed = proposed.as_str(),
                        substituted = fallback.as_str(),
                        "duplicate action replaced with model's fallback"
                    );
                    substitute(
                        decision,
                        fallback,
                        format!(
                            "Substituted fallback '{}' for already-completed '{}'",
                            fallback.as_str(),
                            proposed.as_str()
                        ),
                    )
                }
                None => fallback_decision(
                    completed,
                    &format!("duplicate action '{}' proposed", proposed.as_str()),
                ),
            };
        }

        if decision.is_low_confidence() {
            let has_issues = decision
                .self_check
                .as_ref()
                .is_some_and(|check| !check.potential_issues.is_empty());
            if has_issues {
                if let Some(fallback) = usable_fallback(&decision, completed) {
                    let confidence = decision.confidence.unwrap_or_default();
                    debug!(
                        proposed = decision.next_action.as_str(),
                        substituted = fallback.as_str(),
                        confidence,
                        "low-confidence choice replaced with model's fallback"
                    );
                    return substitute(
                        decision,
                        fallback,
                        format!(
                            "Substituted fallback '{}' for low-confidence choice ({confidence:.2})",
                            fallback.as_str()
                        ),
                    );
                }
            }
        }

        decision
    }
}

/// The model's pre-declared fallback, when it exists, differs from the
/// primary choice, and has not already been completed.
fn usable_fallback(decision: &RouterDecision, completed: &[Action]) -> Option<Action> {
    decision
        .fallback_action
        .filter(|fb| *fb != decision.next_action && !completed.contains(fb))
}

/// Replace the decision's action, noting the substitution in the reasoning.
/// The extracted payload belonged to the original action and is dropped.
fn substitute(mut decision: RouterDecision, action: Action, note: String) -> RouterDecision {
    decision.next_action = action;
    decision.reasoning = format!("{note}. Original reasoning: {}", decision.reasoning);
    decision.extracted_data = None;
    decision
}
