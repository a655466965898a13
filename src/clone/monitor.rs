// snapclone/src/clone/monitor.rs
use anyhow::{Context, Result};
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use crate::api::{CloneState, CloneStatus, ControlPlaneClient};
use crate::clone::progress_log::{format_status_line, timestamp, ProgressLog};
use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorOutcome {
    Completed(CloneStatus),
    /// The local watcher was stopped; the provider job keeps running.
    Interrupted,
}

/// Resolves on Ctrl+C. If the signal handler cannot be installed it never resolves.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "could not listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Polls the clone status on a fixed interval until it reaches a terminal state
/// or `shutdown` resolves. Every observation is printed and appended to the
/// operation's log file. A `Failed` status is returned as `AppError::CloneFailed`.
pub async fn watch_clone<F>(
    client: &ControlPlaneClient,
    db_id: &str,
    operation_id: &str,
    log_dir: &Path,
    poll_interval: Duration,
    shutdown: F,
) -> Result<MonitorOutcome>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut log = ProgressLog::open_append(log_dir, operation_id)?;
    tracing::info!(operation_id, log = %log.path().display(), "monitoring clone operation");

    loop {
        let status = tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(MonitorOutcome::Interrupted),
            res = client.clone_status(db_id, operation_id) => res
                .with_context(|| format!("Failed to get clone status for operation {}", operation_id))?,
        };

        let line = format_status_line(&timestamp(), &status);
        log.append(&line)?;
        println!("{}", line);

        match status.state() {
            CloneState::Failed => {
                println!("Clone operation failed. Please check the logs for more details.");
                return Err(AppError::CloneFailed(operation_id.to_string()).into());
            }
            CloneState::Completed => {
                println!("Clone operation completed successfully.");
                return Ok(MonitorOutcome::Completed(status));
            }
            CloneState::Running(_) | CloneState::Unknown => {}
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(MonitorOutcome::Interrupted),
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}
