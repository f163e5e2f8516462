//! Deterministic fallback heuristic
//!
//! When the LLM call fails or its response is unusable, the router still
//! owes its caller a decision. The table below encodes the two invariants
//! the model is expected but not guaranteed to honor: every session
//! validates first and generates an improvement before finishing. The one
//! exception is a rate-limited session, which stops immediately because any
//! suggested next action would fail the same way.

use promptlift_types::{Action, RouterDecision};
use tracing::debug;

/// Substrings in a failure reason that indicate rate limiting.
const RATE_LIMIT_MARKERS: &[&str] = &["429", "rate limit", "circuit breaker"];

/// Synthesize a decision from the completed-actions list and the failure
/// reason. The table is evaluated strictly in order.
#[must_use]
pub fn fallback_decision(completed: &[Action], reason: &str) -> RouterDecision {
    let decision = if indicates_rate_limiting(reason) {
        RouterDecision::synthesized(
            Action::Done,
            format!("Stopping: the session is rate limited ({reason})"),
        )
    } else if completed.is_empty() {
        RouterDecision::synthesized(
            Action::Validate,
            "Validation is the mandatory first step".to_string(),
        )
    } else if completed == [Action::Validate] && !completed.contains(&Action::ExtractIntent) {
        RouterDecision::synthesized(
            Action::ExtractIntent,
            "Intent extraction follows validation".to_string(),
        )
    } else if completed.len() > 2 && !completed.contains(&Action::ExtractTags) {
        RouterDecision::synthesized(
            Action::ExtractTags,
            "Tags are still missing after several steps".to_string(),
        )
    } else if !completed.contains(&Action::GenerateImprovement) {
        RouterDecision::synthesized(
            Action::GenerateImprovement,
            "An improvement must be generated before finishing".to_string(),
        )
    } else {
        RouterDecision::synthesized(Action::Done, "All mandatory steps are complete".to_string())
    };

    debug!(
        action = decision.next_action.as_str(),
        reason, "fallback heuristic synthesized decision"
    );
    decision
}

fn indicates_rate_limiting(reason: &str) -> bool {
    let reason = reason.to_lowercase();
    RATE_LIMIT_MARKERS
        .iter()
        .any(|marker| reason.contains(marker))
}
