//! Checkpoint runner
//!
//! Runs the checkpoint described by a JSON config file and exits non-zero when
//! validation fails.

use anyhow::{Context, Result};
use assay::config::CheckpointConfig;
use assay::core::ValidationRunner;
use assay::error::AssayError;
use assay::logging::setup::{init_logging, LoggingConfig};
use assay::logging::LogConfig;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the checkpoint config file
    #[arg(long, short)]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Log every evaluated expectation
    #[arg(long, short)]
    verbose: bool,
}

async fn run(args: &Args) -> Result<bool> {
    let config = CheckpointConfig::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let log = if args.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let runner = ValidationRunner::new(config.runner_config(log));
    let registry = config.load_registry()?;
    let checkpoint = config.build_checkpoint()?;

    let run = checkpoint.run(&registry, &runner).await?;
    if run.result.success {
        info!(checkpoint.run_id = %run.run_id, "Validation successful");
    } else {
        let reports: Vec<String> = config
            .reports
            .iter()
            .map(|r| r.path.display().to_string())
            .collect();
        warn!(
            checkpoint.run_id = %run.run_id,
            reports = ?reports,
            "Validation failed, see the reports for details"
        );
    }
    Ok(run.result.success)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let logging = LoggingConfig::default()
        .with_json_format(args.json_logs)
        .with_assay_level(if args.verbose { Level::DEBUG } else { Level::INFO });
    if let Err(e) = init_logging(logging) {
        eprintln!("failed to initialize logging: {e}");
    }

    match run(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if let Some(run) = e
                .downcast_ref::<AssayError>()
                .and_then(AssayError::checkpoint_run)
            {
                warn!(
                    checkpoint.run_id = %run.run_id,
                    suite.result = %if run.result.success { "passed" } else { "failed" },
                    "Validation completed before the action failure"
                );
            }
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
