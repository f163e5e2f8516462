//! The router's decision contract
//!
//! Every router call returns a `RouterDecision` parsed from the model's JSON
//! response. Parsing is strict on `nextAction` (unknown names fail closed)
//! and lenient on everything else: the advisory fields are optional and an
//! absent `extractedData` is valid, meaning "nothing extracted".

use crate::Action;
use serde::{Deserialize, Serialize};

/// Confidence below this threshold makes the router consider the model's
/// pre-declared fallback action instead of its primary choice.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Self-reported reasoning style, advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasoningType {
    Analytical,
    Sequential,
    PatternMatching,
    Contextual,
}

/// The model's own audit of its decision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfCheck {
    /// Whether the model believes its chosen action is valid
    #[serde(default)]
    pub is_action_valid: bool,
    /// Issues the model itself sees with the choice
    #[serde(default)]
    pub potential_issues: Vec<String>,
    /// An alternative the model would pick if the primary is rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_action: Option<Action>,
}

/// The contract returned by every router call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterDecision {
    /// The single next action to take. Required.
    pub next_action: Action,
    /// Free text explaining the choice; kept for auditability, never validated.
    #[serde(default)]
    pub reasoning: String,
    /// Human-readable step estimate, advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<String>,
    /// Inline extraction payload. Present only for extraction actions; its
    /// shape depends on the action (an array for `extractTags`, an object of
    /// named fields otherwise). Absence means "nothing extracted".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<serde_json::Value>,
    /// Self-reported reasoning style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_type: Option<ReasoningType>,
    /// Self-reported confidence in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// The model's own audit of its decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_check: Option<SelfCheck>,
    /// A pre-declared alternative action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_action: Option<Action>,
}

impl RouterDecision {
    /// Build a minimal decision with just an action and reasoning.
    ///
    /// Used by the deterministic fallback path, which never carries the
    /// advisory fields.
    #[must_use]
    pub fn synthesized(next_action: Action, reasoning: impl Into<String>) -> Self {
        Self {
            next_action,
            reasoning: reasoning.into(),
            progress: None,
            extracted_data: None,
            reasoning_type: None,
            confidence: None,
            self_check: None,
            fallback_action: None,
        }
    }

    /// Whether the self-reported confidence is below the substitution
    /// threshold. Absent confidence is trusted.
    #[must_use]
    pub fn is_low_confidence(&self) -> bool {
        self.confidence
            .is_some_and(|c| c < CONFIDENCE_THRESHOLD)
    }
}
