//! Resilience layer for promptlift
//!
//! Three cooperating pieces keep a session from burning quota once the
//! provider starts rejecting calls:
//!
//! - [`RetryPolicy`]: classifies failures and computes capped exponential
//!   backoff with jitter. Only rate-limit and overload errors qualify.
//! - [`CircuitBreaker`]: session-wide tally of rate-limit failures across
//!   all call types; opens at the threshold and rejects everything until a
//!   cooldown elapses.
//! - [`GuardedBackend`]: decorator applying both to any `LlmBackend`.

mod backend;
mod breaker;
mod retry;

pub use backend::GuardedBackend;
pub use breaker::CircuitBreaker;
pub use retry::RetryPolicy;
