//! promptlift: an LLM-driven prompt analysis pipeline
//!
//! A sequential router asks the model "what is the next action?" once per
//! step; the orchestrator executes that action and feeds the outcome back.
//! Three resilience layers keep a session from burning quota under
//! persistent rate limiting: exponential-backoff retry, a session-wide
//! circuit breaker, and a deterministic router fallback.
//!
//! Typical embedding:
//!
//! ```no_run
//! use promptlift::{CircuitBreaker, Config, GuardedBackend, Orchestrator};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), promptlift::LiftError> {
//! let config = Config::discover(None)?;
//! let backend = promptlift::backend_from_config(&config)?;
//! let breaker = Arc::new(CircuitBreaker::new());
//! let guarded = Arc::new(GuardedBackend::new(backend, breaker.clone()));
//!
//! let orchestrator = Orchestrator::new(guarded, breaker);
//! let result = orchestrator.orchestrate("help me write a cover letter", None).await?;
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! # Ok(())
//! # }
//! ```

pub use promptlift_config::{Config, CONFIG_FILE_NAME};
pub use promptlift_engine::{
    context_summary, ContextSink, MemoryContextStore, Orchestrator, RunHandoff, StepCallback,
    StoredRun, DEFAULT_MAX_STEPS,
};
pub use promptlift_llm::{
    from_config as backend_from_config, LlmBackend, LlmRequest, LlmResponse, Message, Role,
};
pub use promptlift_resilience::{CircuitBreaker, GuardedBackend, RetryPolicy};
pub use promptlift_router::{fallback_decision, Router};
pub use promptlift_types::{
    Action, ImprovementSuggestion, OrchestrationResult, OrchestrationStep, ReasoningType,
    RouterDecision, SelfCheck, ValidationReport, CONFIDENCE_THRESHOLD,
};
pub use promptlift_utils::{init_tracing, EngineError, LiftError, LlmError, RouterError};
