// snapclone/src/api/client.rs
use reqwest::{Method, StatusCode};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::api::types::{
    CloneStartResponse, CloneStarted, CloneStatus, DatabaseInfo, KeyspaceRemoval, SnapshotList,
};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Thin client for the provider's `/v2` database control plane.
#[derive(Clone)]
pub struct ControlPlaneClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl fmt::Debug for ControlPlaneClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlPlaneClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ControlPlaneClient {
    pub fn new(base_url: Url, token: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "API URL cannot be used as a base: {}",
                base_url
            )));
        }
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.token.clone(),
            config.request_timeout,
        )
    }

    /// Joins percent-encoded path segments onto the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("API URL cannot be used as a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, method: Method, url: Url) -> Result<(StatusCode, String)> {
        tracing::debug!(method = method.as_str(), url = url.as_str(), "control-plane request");
        let response = self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "control-plane response");
        Ok((status, body))
    }

    pub async fn list_snapshots(&self, db_id: &str) -> Result<SnapshotList> {
        let url = self.endpoint(&["v2", "databases", db_id, "snapshots"])?;
        let (status, body) = self.send(Method::GET, url).await?;
        if status != StatusCode::OK {
            return Err(AppError::ApiStatus {
                action: "get snapshots",
                status,
                body,
            });
        }
        serde_json::from_str(&body).map_err(|_| AppError::InvalidJson(body))
    }

    /// Snapshots are listed oldest first; the last entry is the latest.
    pub async fn latest_snapshot_id(&self, db_id: &str) -> Result<String> {
        let list = self.list_snapshots(db_id).await?;
        list.snapshots
            .last()
            .map(|snapshot| snapshot.id.clone())
            .ok_or_else(|| AppError::NoSnapshots(db_id.to_string()))
    }

    pub async fn database_keyspaces(&self, db_id: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["v2", "databases", db_id])?;
        let (status, body) = self.send(Method::GET, url).await?;
        if status != StatusCode::OK {
            return Err(AppError::ApiStatus {
                action: "get the keyspaces",
                status,
                body,
            });
        }
        let info: DatabaseInfo =
            serde_json::from_str(&body).map_err(|_| AppError::InvalidJson(body))?;
        info.info
            .and_then(|details| details.keyspaces)
            .ok_or_else(|| AppError::NoKeyspaces(db_id.to_string()))
    }

    pub async fn remove_keyspace(&self, db_id: &str, keyspace: &str) -> Result<KeyspaceRemoval> {
        let url = self.endpoint(&["v2", "databases", db_id, "keyspaces", keyspace])?;
        let (status, body) = self.send(Method::DELETE, url).await?;
        if status.as_u16() >= 300 {
            return Err(AppError::ApiStatus {
                action: "remove the keyspace",
                status,
                body,
            });
        }
        Ok(KeyspaceRemoval {
            keyspace: keyspace.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    pub async fn start_clone(
        &self,
        target_db_id: &str,
        source_db_id: &str,
        snapshot_id: &str,
    ) -> Result<CloneStarted> {
        let mut url = self.endpoint(&["v2", "databases", target_db_id, "cloneFrom", source_db_id])?;
        url.query_pairs_mut().append_pair("snapshotID", snapshot_id);
        let (status, body) = self.send(Method::POST, url).await?;
        if status != StatusCode::OK {
            return Err(AppError::ApiStatus {
                action: "start clone operation",
                status,
                body,
            });
        }
        let operation_id = serde_json::from_str::<CloneStartResponse>(&body)
            .ok()
            .and_then(|response| response.operation_id)
            .filter(|id| !id.trim().is_empty());
        match operation_id {
            Some(operation_id) => Ok(CloneStarted {
                operation_id,
                raw_body: body,
            }),
            None => Err(AppError::MissingOperationId(body)),
        }
    }

    /// Fetches the clone-operation document. The HTTP status is not checked; only the body must decode.
    pub async fn clone_status(&self, db_id: &str, operation_id: &str) -> Result<CloneStatus> {
        let url = self.endpoint(&["v2", "databases", db_id, "cloneStatus", operation_id])?;
        let (status, body) = self.send(Method::GET, url).await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), operation_id, "clone status returned a non-success code");
        }
        serde_json::from_str(&body).map_err(|_| AppError::InvalidJson(body))
    }
}
