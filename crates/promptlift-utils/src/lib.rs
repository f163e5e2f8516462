//! Shared infrastructure for promptlift: error taxonomy and logging setup
//!
//! Library crates emit events through the `tracing` macros directly; this
//! crate only owns the subscriber setup.

pub mod error;
pub mod logging;

pub use error::{EngineError, LiftError, LlmError, RouterError};
pub use logging::init_tracing;
