mod logic;
pub(crate) mod monitor;
pub(crate) mod progress_log;

use anyhow::{Context, Result};

use crate::api::ControlPlaneClient;
use crate::config::AppConfig;
use monitor::MonitorOutcome;

/// Entry point for `start-clone`. With `follow`, continues into the monitor loop.
pub async fn run_start_flow(app_config: &AppConfig, client: &ControlPlaneClient, follow: bool) -> Result<()> {
    let clone = logic::perform_start_orchestration(app_config, client).await?;
    let operation_id = &clone.started.operation_id;

    println!(
        "OperationID: {} is written to the file '{}'",
        operation_id,
        clone.log_path.display()
    );
    if follow {
        return run_monitor_flow(app_config, client, operation_id).await;
    }
    println!(
        "Run 'snapclone monitor {}' to monitor the clone operation.",
        operation_id
    );
    Ok(())
}

/// Entry point for `status`: a single status fetch against the target database.
pub async fn run_status_flow(app_config: &AppConfig, client: &ControlPlaneClient, operation_id: &str) -> Result<()> {
    println!(
        "Getting clone status for operationID: {} . Target DB ID: {}",
        operation_id, app_config.target_db_id
    );
    let status = client
        .clone_status(&app_config.target_db_id, operation_id)
        .await
        .with_context(|| format!("Failed to get clone status for operation {}", operation_id))?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// Entry point for `monitor`.
pub async fn run_monitor_flow(app_config: &AppConfig, client: &ControlPlaneClient, operation_id: &str) -> Result<()> {
    println!(
        "Monitoring clone operation for operationID: {} . Target DB ID: {}",
        operation_id, app_config.target_db_id
    );
    println!("\npress Ctrl+C to exit. Note: The clone job will still continue to run.");

    let outcome = monitor::watch_clone(
        client,
        &app_config.target_db_id,
        operation_id,
        &app_config.log_dir,
        app_config.poll_interval,
        monitor::ctrl_c(),
    )
    .await?;

    match outcome {
        MonitorOutcome::Completed(status) => {
            println!("{}", serde_json::to_string_pretty(&status.status)?);
        }
        MonitorOutcome::Interrupted => {
            println!(
                "Stopped monitoring. Clone operation {} continues on the provider side.",
                operation_id
            );
        }
    }
    Ok(())
}

/// Entry point for `latest-snapshot`.
pub async fn run_latest_snapshot_flow(app_config: &AppConfig, client: &ControlPlaneClient) -> Result<()> {
    let snapshot_id = client
        .latest_snapshot_id(&app_config.source_db_id)
        .await
        .context("Failed to resolve the latest snapshot of the source database")?;
    println!("{}", snapshot_id);
    Ok(())
}
