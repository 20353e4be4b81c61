//! Main application entry point (HTTP API binary).
//!
//! This is a thin wrapper around the `bulk_mutator` library that handles:
//! - Environment variable loading (.env file)
//! - Command-line argument parsing
//! - Logger initialization
//! - Serving the HTTP API until Ctrl-C
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use bulk_mutator::app::{print_error_statistics, print_progress_summary, shutdown_on_ctrl_c};
use bulk_mutator::initialization::init_logger_with;
use bulk_mutator::{start_server, AppState, Config, Opt, Workloads};

#[tokio::main]
async fn main() -> Result<()> {
    // Load SHOP_* variables from .env; next to the executable as a fallback
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    if let Err(e) = run(config).await {
        eprintln!("bulk_mutator error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

async fn run(config: Config) -> Result<()> {
    let shutdown = CancellationToken::new();
    let workloads = Workloads::from_config(&config, shutdown.clone())
        .context("Failed to initialize GraphQL client")?;
    let engine = workloads.engine().clone();

    tokio::spawn(shutdown_on_ctrl_c(shutdown.clone()));

    start_server(config.port, AppState::new(workloads), shutdown).await?;

    print_progress_summary(engine.progress());
    print_error_statistics(engine.stats());
    Ok(())
}
