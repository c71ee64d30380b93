//! Main entry point for the gimli binary
//!
//! Loads an experiment file, wires the Fly.io saboteur and HTTP probe
//! executor into the orchestrator, and runs one experiment.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use runner::{ExperimentReport, FlySaboteur, HttpProbeExecutor, Orchestrator};
use shared::logging;

/// Chaos experiment runner for Fly.io applications
#[derive(Parser)]
#[command(name = "gimli")]
#[command(about = "Validates steady state, restarts random machines, aborts on regression")]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Path to the experiment YAML file
    #[arg(long, default_value = shared::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Seed for target selection, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print version and exit
    #[arg(long)]
    pub version: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.version {
        println!("gimli version {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    logging::init_tracing(Some(&args.log_level));

    let started = Instant::now();
    match run(args).await {
        Ok(report) => {
            logging::log_success(&format!(
                "Experiment '{}' passed: {} attacks, {} failed, elapsed {:?}",
                report.experiment,
                report.attacks(),
                report.scenario.failed_attacks,
                started.elapsed()
            ));
            ExitCode::SUCCESS
        }
        Err(err) => {
            logging::log_error("Experiment", &format!("{err:#}"));
            tracing::error!("Elapsed time: {:?}", started.elapsed());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExperimentReport> {
    let experiment = shared::load_experiment(&args.config)
        .with_context(|| format!("loading experiment from {}", args.config.display()))?;

    logging::log_startup(&format!("experiment '{}'", experiment.name));

    let saboteur = FlySaboteur::from_env().context("configuring Fly.io provider")?;
    let mut orchestrator = Orchestrator::new(saboteur, HttpProbeExecutor::new());
    if let Some(seed) = args.seed {
        orchestrator = orchestrator.with_seed(seed);
    }

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_on_signal(cancel.clone()));

    let report = orchestrator
        .run_experiment(&experiment, cancel)
        .await
        .context("experiment failed")?;
    Ok(report)
}

/// Cancel `cancel` on Ctrl-C or SIGTERM
async fn shutdown_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                logging::log_error("SIGTERM handler", &err);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => logging::log_shutdown("Received Ctrl+C signal"),
            Err(err) => {
                logging::log_error("Signal handling", &err);
                return;
            }
        },
        _ = terminate => logging::log_shutdown("Received SIGTERM"),
    }

    cancel.cancel();
}
