//! Sequential router for promptlift
//!
//! The router asks the model "what is the next action?" once per step and
//! validates the answer before the orchestrator acts on it. Failures are
//! absorbed into a deterministic fallback heuristic; only a breaker-open
//! condition propagates as an error.

mod fallback;
mod parse;
mod prompt;
mod router;

pub use fallback::fallback_decision;
pub use parse::parse_decision;
pub use prompt::render_router_prompt;
pub use router::Router;
