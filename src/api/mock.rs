// In-process stand-in for the control plane, used by tests.
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::Router;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

pub(crate) type SharedMock = Arc<Mutex<MockControlPlane>>;

#[derive(Debug, Default)]
pub(crate) struct MockControlPlane {
    pub snapshot_ids: Vec<String>,
    pub snapshots_status: Option<u16>,
    pub keyspaces: Option<Vec<String>>,
    pub failing_keyspaces: Vec<String>,
    pub operation_id: Option<String>,
    pub clone_start_status: Option<u16>,
    /// Raw status bodies served in order; the last one repeats.
    pub clone_statuses: VecDeque<String>,
    pub requests: Vec<String>,
    pub bearer_tokens: Vec<String>,
}

impl MockControlPlane {
    fn record(&mut self, line: String, headers: &HeaderMap) {
        self.requests.push(line);
        if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            self.bearer_tokens.push(auth.to_string());
        }
    }
}

pub(crate) async fn spawn(mock: MockControlPlane) -> anyhow::Result<(Url, SharedMock)> {
    let shared: SharedMock = Arc::new(Mutex::new(mock));
    let app = Router::new()
        .route("/v2/databases/:db", get(database_info))
        .route("/v2/databases/:db/snapshots", get(snapshots))
        .route("/v2/databases/:db/keyspaces/:keyspace", delete(remove_keyspace))
        .route("/v2/databases/:target/cloneFrom/:source", post(clone_from))
        .route("/v2/databases/:db/cloneStatus/:operation", get(clone_status))
        .with_state(shared.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((Url::parse(&format!("http://{}", addr))?, shared))
}

fn code(raw: Option<u16>) -> StatusCode {
    raw.and_then(|c| StatusCode::from_u16(c).ok()).unwrap_or(StatusCode::OK)
}

async fn snapshots(
    State(state): State<SharedMock>,
    Path(db): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let mut mock = state.lock().unwrap();
    mock.record(format!("GET /v2/databases/{}/snapshots", db), &headers);
    let status = code(mock.snapshots_status);
    if status != StatusCode::OK {
        return (status, "snapshot listing unavailable".to_string());
    }
    let snapshots: Vec<_> = mock.snapshot_ids.iter().map(|id| json!({ "id": id })).collect();
    (status, json!({ "snapshots": snapshots }).to_string())
}

async fn database_info(
    State(state): State<SharedMock>,
    Path(db): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let mut mock = state.lock().unwrap();
    mock.record(format!("GET /v2/databases/{}", db), &headers);
    let body = match &mock.keyspaces {
        Some(keyspaces) => json!({ "id": db, "info": { "name": "target", "keyspaces": keyspaces } }),
        None => json!({ "id": db, "info": { "name": "target" } }),
    };
    (StatusCode::OK, body.to_string())
}

async fn remove_keyspace(
    State(state): State<SharedMock>,
    Path((db, keyspace)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let mut mock = state.lock().unwrap();
    mock.record(format!("DELETE /v2/databases/{}/keyspaces/{}", db, keyspace), &headers);
    if mock.failing_keyspaces.contains(&keyspace) {
        return (StatusCode::CONFLICT, format!("keyspace {} is locked", keyspace));
    }
    (StatusCode::ACCEPTED, String::new())
}

async fn clone_from(
    State(state): State<SharedMock>,
    Path((target, source)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let mut mock = state.lock().unwrap();
    let snapshot = query.get("snapshotID").cloned().unwrap_or_default();
    mock.record(
        format!("POST /v2/databases/{}/cloneFrom/{}?snapshotID={}", target, source, snapshot),
        &headers,
    );
    let status = code(mock.clone_start_status);
    if status != StatusCode::OK {
        return (status, "clone rejected".to_string());
    }
    let body = match &mock.operation_id {
        Some(id) => json!({ "operationID": id }),
        None => json!({ "accepted": true }),
    };
    (status, body.to_string())
}

async fn clone_status(
    State(state): State<SharedMock>,
    Path((db, operation)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let mut mock = state.lock().unwrap();
    mock.record(format!("GET /v2/databases/{}/cloneStatus/{}", db, operation), &headers);
    let body = if mock.clone_statuses.len() > 1 {
        mock.clone_statuses.pop_front().unwrap_or_default()
    } else {
        mock.clone_statuses.front().cloned().unwrap_or_default()
    };
    (StatusCode::OK, body)
}

/// Validated config pointing at a spawned mock, with a fast poll interval.
pub(crate) fn config_for(base_url: &Url, log_dir: &std::path::Path) -> anyhow::Result<crate::config::AppConfig> {
    crate::config::AppConfig::from_raw(crate::config::RawConfig {
        environment: Some("dev".into()),
        source_db_id: Some("src-db".into()),
        target_db_id: Some("dst-db".into()),
        token: Some("tok-123".into()),
        api_base_url: Some(base_url.to_string()),
        poll_interval_secs: Some(1),
        request_timeout_secs: Some(5),
        log_dir: Some(log_dir.to_path_buf()),
    })
}
