//! Shared data model for the promptlift pipeline
//!
//! This crate defines the wire contract between the router and the LLM
//! (`RouterDecision` and friends) plus the records the orchestrator builds
//! while driving a run (`OrchestrationStep`, `OrchestrationResult`).

mod action;
mod decision;
mod outcome;

pub use action::Action;
pub use decision::{ReasoningType, RouterDecision, SelfCheck, CONFIDENCE_THRESHOLD};
pub use outcome::{
    ImprovementSuggestion, OrchestrationResult, OrchestrationStep, ValidationReport,
};
