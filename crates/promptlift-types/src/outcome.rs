//! Records built while a run executes
//!
//! `OrchestrationStep` is one iteration's audit record; the ordered list of
//! steps is the trail of a single run. `OrchestrationResult` is the aggregate
//! handed back to the caller (and to the persistence collaborator) at exit.

use crate::{Action, RouterDecision};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One iteration's record. Immutable once appended to the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationStep {
    /// The action this step executed (or attempted)
    pub action: Action,
    /// The full router decision that produced the action
    pub decision: RouterDecision,
    /// The step's result payload, if it succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// The step's error message, if it failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the step was recorded
    pub recorded_at: DateTime<Utc>,
}

impl OrchestrationStep {
    /// Record a successful step.
    #[must_use]
    pub fn succeeded(
        action: Action,
        decision: RouterDecision,
        result: Option<serde_json::Value>,
    ) -> Self {
        Self {
            action,
            decision,
            result,
            error: None,
            recorded_at: Utc::now(),
        }
    }

    /// Record a failed step.
    #[must_use]
    pub fn failed(action: Action, decision: RouterDecision, error: impl Into<String>) -> Self {
        Self {
            action,
            decision,
            result: None,
            error: Some(error.into()),
            recorded_at: Utc::now(),
        }
    }
}

/// Output shape of the `validate` sub-call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Whether the prompt is usable as-is
    pub is_acceptable: bool,
    /// Quality score in [0, 1]
    pub quality_score: f64,
    /// Concrete problems found
    #[serde(default)]
    pub issues: Vec<String>,
    /// One-line assessment
    #[serde(default)]
    pub summary: String,
}

/// Output shape of the `generateImprovement` sub-call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementSuggestion {
    /// The rewritten prompt
    pub improved_prompt: String,
    /// What was changed, one entry per improvement
    #[serde(default)]
    pub improvements: Vec<String>,
    /// Why the rewrite is better
    #[serde(default)]
    pub reasoning: String,
    /// Which accumulated context fields informed the rewrite
    #[serde(default)]
    pub context_used: Vec<String>,
}

/// Aggregate output of one orchestration run.
///
/// Built incrementally by the orchestrator and finalized at loop exit. On a
/// fatal rate-limit abort the partially-built value travels inside the error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    /// Ordered audit trail, one entry per iteration
    pub steps: Vec<OrchestrationStep>,
    /// Result of the `validate` step, if it ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    /// Extraction fragments merged by action name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_context: Option<BTreeMap<String, serde_json::Value>>,
    /// Result of the `generateImprovement` step, if it ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement: Option<ImprovementSuggestion>,
    /// Per-step error messages, in step order
    #[serde(default)]
    pub errors: Vec<String>,
    /// Total number of recorded steps
    pub total_steps: usize,
}

impl OrchestrationResult {
    /// Actions that completed successfully, in completion order.
    #[must_use]
    pub fn completed_actions(&self) -> Vec<Action> {
        self.steps
            .iter()
            .filter(|s| s.error.is_none())
            .map(|s| s.action)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_round_trips_through_json() {
        let step = OrchestrationStep::succeeded(
            Action::ExtractIntent,
            RouterDecision::synthesized(Action::ExtractIntent, "intent missing"),
            Some(serde_json::json!({"intent": "learn rust"})),
        );
        let json = serde_json::to_string(&step).unwrap();
        let back: OrchestrationStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back.action, Action::ExtractIntent);
        assert!(back.error.is_none());
    }

    #[test]
    fn failed_step_carries_error_only() {
        let step = OrchestrationStep::failed(
            Action::Validate,
            RouterDecision::synthesized(Action::Validate, "first step"),
            "503 from provider",
        );
        assert!(step.result.is_none());
        assert_eq!(step.error.as_deref(), Some("503 from provider"));
    }

    #[test]
    fn completed_actions_skips_failed_steps() {
        let mut result = OrchestrationResult::default();
        result.steps.push(OrchestrationStep::succeeded(
            Action::Validate,
            RouterDecision::synthesized(Action::Validate, ""),
            None,
        ));
        result.steps.push(OrchestrationStep::failed(
            Action::ExtractTask,
            RouterDecision::synthesized(Action::ExtractTask, ""),
            "boom",
        ));
        assert_eq!(result.completed_actions(), vec![Action::Validate]);
    }
}
