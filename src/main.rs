//! Snapshot Clone Tool
//!
//! Clones a managed database from its source's latest snapshot through the
//! provider's control-plane API, and follows the clone operation to completion.

// snapclone/src/main.rs
mod api;
mod clone;
mod config;
mod errors;
mod keyspaces;
mod utils;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use api::ControlPlaneClient;
use config::AppConfig;

#[derive(Parser)]
#[command(name = "snapclone")]
#[command(about = "Clone a database from its source's latest snapshot and monitor the clone operation")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// JSON config file; its values override .env and the environment
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the .env file
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the clone operation from the source's latest snapshot
    #[command(alias = "start_clone")]
    StartClone {
        /// Keep monitoring the operation after it starts
        #[arg(long)]
        monitor: bool,
    },
    /// Monitor the clone operation until it completes or fails
    #[command(alias = "monitor_clone_operation")]
    Monitor { operation_id: String },
    /// Get the latest snapshot ID for the source database
    #[command(alias = "get_latest_snapshot_id")]
    LatestSnapshot,
    /// Get the status of the clone operation
    #[command(alias = "clone_operation_status")]
    Status { operation_id: String },
    /// Destroy the target database keyspaces
    #[command(alias = "destroy_target_db_keyspaces")]
    DestroyKeyspaces,
    /// Get the target database keyspaces
    #[command(alias = "get_target_db_keyspaces")]
    Keyspaces,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(cli_error_exit_code(&e));
        }
    };
    utils::init_tracing();

    match run_app(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

/// Help output exits 0; every other parse failure exits 1 like a runtime error.
fn cli_error_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

async fn run_app(cli: Cli) -> Result<()> {
    let app_config = AppConfig::load(&cli.env_file, cli.config.as_deref())
        .context("Failed to load application configuration")?;
    tracing::debug!(config = ?app_config, "configuration loaded");

    let client = ControlPlaneClient::from_config(&app_config)
        .context("Failed to build the control-plane client")?;

    match cli.command {
        Command::StartClone { monitor } => clone::run_start_flow(&app_config, &client, monitor)
            .await
            .context("Start clone failed")?,
        Command::Monitor { operation_id } => clone::run_monitor_flow(&app_config, &client, &operation_id)
            .await
            .context("Monitoring the clone operation failed")?,
        Command::LatestSnapshot => clone::run_latest_snapshot_flow(&app_config, &client).await?,
        Command::Status { operation_id } => clone::run_status_flow(&app_config, &client, &operation_id).await?,
        Command::DestroyKeyspaces => keyspaces::run_destroy_flow(&app_config, &client)
            .await
            .context("Destroying target keyspaces failed")?,
        Command::Keyspaces => keyspaces::run_list_flow(&app_config, &client).await?,
    }
    Ok(())
}
