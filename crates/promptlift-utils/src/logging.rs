//! Tracing setup for promptlift
//!
//! One subscriber per process, configured at the binary edge. Library code
//! only emits `tracing` events with structured fields (`action`, `attempt`,
//! `provider`, `step`); formatting is decided here.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbose mode enables debug-level
/// events for promptlift crates and compact mode stays at info.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("promptlift=debug,info")
            } else {
                EnvFilter::try_new("promptlift=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
