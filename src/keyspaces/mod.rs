// snapclone/src/keyspaces/mod.rs
use anyhow::{Context, Result};

use crate::api::{ControlPlaneClient, KeyspaceRemoval};
use crate::config::AppConfig;
use crate::errors::AppError;

#[derive(Debug, Default)]
pub struct DestroySummary {
    pub removed: Vec<KeyspaceRemoval>,
    pub failed: Vec<(String, AppError)>,
}

/// Deletes every keyspace of `db_id`. A failed delete is recorded and the
/// remaining keyspaces are still attempted.
pub async fn destroy_keyspaces(client: &ControlPlaneClient, db_id: &str) -> Result<DestroySummary> {
    let keyspaces = client
        .database_keyspaces(db_id)
        .await
        .with_context(|| format!("Failed to list keyspaces of database {}", db_id))?;

    let mut summary = DestroySummary::default();
    for keyspace in keyspaces {
        println!("Removing keyspace: {}", keyspace);
        match client.remove_keyspace(db_id, &keyspace).await {
            Ok(removal) => {
                println!(
                    "✓ Keyspace {} removed successfully. Status code: {} - {}",
                    removal.keyspace, removal.status, removal.body
                );
                summary.removed.push(removal);
            }
            Err(e) => {
                eprintln!("❌ Failed to remove keyspace {}: {}", keyspace, e);
                summary.failed.push((keyspace, e));
            }
        }
    }
    Ok(summary)
}

/// Entry point for `keyspaces`.
pub async fn run_list_flow(app_config: &AppConfig, client: &ControlPlaneClient) -> Result<()> {
    let keyspaces = client
        .database_keyspaces(&app_config.target_db_id)
        .await
        .with_context(|| format!("Failed to list keyspaces of database {}", app_config.target_db_id))?;
    println!("{}", serde_json::to_string_pretty(&keyspaces)?);
    Ok(())
}

/// Entry point for `destroy-keyspaces`.
pub async fn run_destroy_flow(app_config: &AppConfig, client: &ControlPlaneClient) -> Result<()> {
    let summary = destroy_keyspaces(client, &app_config.target_db_id).await?;
    if !summary.failed.is_empty() {
        let names: Vec<&str> = summary.failed.iter().map(|(name, _)| name.as_str()).collect();
        anyhow::bail!(
            "Removed {} keyspace(s); failed to remove {}: {}",
            summary.removed.len(),
            names.len(),
            names.join(", ")
        );
    }
    println!("Removed {} keyspace(s) from {}.", summary.removed.len(), app_config.target_db_id);
    Ok(())
}
