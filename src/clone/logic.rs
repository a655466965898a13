// snapclone/src/clone/logic.rs
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::api::{CloneStarted, ControlPlaneClient};
use crate::clone::progress_log::write_start_record;
use crate::config::AppConfig;

#[derive(Debug, Clone)]
pub struct StartedClone {
    pub snapshot_id: String,
    pub started: CloneStarted,
    pub log_path: PathBuf,
}

/// Clones the source's latest snapshot into the target:
/// 1. Resolves the latest snapshot ID of the source database.
/// 2. Starts the provider-side clone into the target database.
/// 3. Records the operation ID in `clone_<operationID>.txt`.
pub async fn perform_start_orchestration(
    app_config: &AppConfig,
    client: &ControlPlaneClient,
) -> Result<StartedClone> {
    println!(
        "Environment: {} ({})",
        app_config.environment, app_config.api_base_url
    );
    let snapshot_id = client
        .latest_snapshot_id(&app_config.source_db_id)
        .await
        .context("Failed to resolve the latest snapshot of the source database")?;
    println!(
        "Starting clone operation for snapshotID: {} . Source DB ID: {} . Target DB ID: {}",
        snapshot_id, app_config.source_db_id, app_config.target_db_id
    );

    let started = client
        .start_clone(&app_config.target_db_id, &app_config.source_db_id, &snapshot_id)
        .await
        .context("Failed to start clone operation")?;
    println!("{}", started.raw_body);
    println!(
        "✅ Clone operation started successfully. OperationID: {}",
        started.operation_id
    );

    let log_path = write_start_record(&app_config.log_dir, &started.operation_id)?;
    tracing::info!(
        environment = app_config.environment.as_str(),
        operation_id = started.operation_id.as_str(),
        snapshot_id = snapshot_id.as_str(),
        "clone started"
    );

    Ok(StartedClone {
        snapshot_id,
        started,
        log_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{self, MockControlPlane};
    use std::fs;

    #[tokio::test]
    async fn test_start_uses_latest_snapshot_and_writes_log() -> anyhow::Result<()> {
        let (base_url, shared) = mock::spawn(MockControlPlane {
            snapshot_ids: vec!["snap-a".into(), "snap-b".into()],
            operation_id: Some("op-42".into()),
            ..Default::default()
        })
        .await?;
        let dir = tempfile::tempdir()?;
        let config = mock::config_for(&base_url, dir.path())?;
        let client = ControlPlaneClient::from_config(&config)?;

        let clone = perform_start_orchestration(&config, &client).await?;

        assert_eq!(clone.snapshot_id, "snap-b");
        assert_eq!(clone.started.operation_id, "op-42");
        assert_eq!(clone.log_path, dir.path().join("clone_op-42.txt"));
        let content = fs::read_to_string(&clone.log_path)?;
        assert!(content.contains("Clone operation started successfully. OperationID: op-42"));

        let mock = shared.lock().unwrap();
        assert_eq!(
            mock.requests,
            vec![
                "GET /v2/databases/src-db/snapshots",
                "POST /v2/databases/dst-db/cloneFrom/src-db?snapshotID=snap-b",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_start_without_snapshots_does_not_post() -> anyhow::Result<()> {
        let (base_url, shared) = mock::spawn(MockControlPlane {
            operation_id: Some("op-1".into()),
            ..Default::default()
        })
        .await?;
        let dir = tempfile::tempdir()?;
        let config = mock::config_for(&base_url, dir.path())?;
        let client = ControlPlaneClient::from_config(&config)?;

        assert!(perform_start_orchestration(&config, &client).await.is_err());
        assert_eq!(shared.lock().unwrap().requests.len(), 1);
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }
}
