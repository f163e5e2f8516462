//! Orchestration engine for promptlift
//!
//! The [`Orchestrator`] drives the router/executor loop: it checks the
//! circuit breaker before every iteration, dispatches decided actions, and
//! accumulates the audit trail and extracted context into an
//! `OrchestrationResult`. Quota failures abort the run with the partial
//! result attached; everything else is recorded per step.

mod context;
mod executor;
mod orchestrator;

pub use context::{context_summary, ContextSink, MemoryContextStore, RunHandoff, StoredRun};
pub use executor::{generate_improved_prompt, validate_prompt_quality};
pub use orchestrator::{Orchestrator, StepCallback, DEFAULT_MAX_STEPS};
