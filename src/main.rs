//! promptlift CLI
//!
//! `promptlift run "<prompt>"` drives one orchestration run and prints the
//! result as JSON on stdout. Step-by-step progress and logs go to stderr so
//! the stdout stream stays machine-readable.

use anyhow::Context;
use clap::{Parser, Subcommand};
use promptlift::{
    init_tracing, CircuitBreaker, Config, EngineError, GuardedBackend, MemoryContextStore,
    Orchestrator, OrchestrationStep,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "promptlift", version, about = "LLM-driven prompt analysis pipeline")]
struct Cli {
    /// Path to a config file (default: ./promptlift.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze and improve a prompt
    Run {
        /// The prompt to analyze
        prompt: String,

        /// Override the iteration cap
        #[arg(long)]
        max_steps: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    match cli.command {
        Command::Run { prompt, max_steps } => run(cli.config.as_deref(), &prompt, max_steps).await,
    }
}

async fn run(
    config_path: Option<&std::path::Path>,
    prompt: &str,
    max_steps: Option<usize>,
) -> anyhow::Result<()> {
    let config = Config::discover(config_path).context("failed to load configuration")?;

    let backend = promptlift::backend_from_config(&config).context("failed to build backend")?;
    let breaker = Arc::new(CircuitBreaker::new());
    let guarded = Arc::new(GuardedBackend::new(backend, breaker.clone()));

    let mut orchestrator = Orchestrator::new(guarded, breaker)
        .with_context_sink(Arc::new(MemoryContextStore::new()));
    if let Some(cap) = max_steps.or(config.engine.max_steps) {
        orchestrator = orchestrator.with_max_steps(cap);
    }

    let on_step = |step: &OrchestrationStep| {
        match &step.error {
            Some(error) => eprintln!("step {:<20} failed: {error}", step.action.as_str()),
            None => eprintln!("step {:<20} ok", step.action.as_str()),
        }
    };

    match orchestrator.orchestrate(prompt, Some(&on_step)).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(err @ EngineError::Aborted { .. }) => {
            // Surface whatever was built before the hard stop, then fail.
            println!("{}", serde_json::to_string_pretty(err.partial_result())?);
            if let Some(secs) = err.remaining_cooldown_secs() {
                eprintln!("aborted: rate limited; retry in {secs}s");
            } else {
                eprintln!("aborted: {err}");
            }
            anyhow::bail!("orchestration aborted")
        }
    }
}
