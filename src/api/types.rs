// snapclone/src/api/types.rs
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotList {
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DatabaseInfo {
    pub info: Option<DatabaseDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DatabaseDetails {
    pub keyspaces: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CloneStartResponse {
    #[serde(rename = "operationID")]
    pub operation_id: Option<String>,
}

/// Result of starting a clone: the provider's operation ID plus the raw response body.
#[derive(Debug, Clone)]
pub struct CloneStarted {
    pub operation_id: String,
    pub raw_body: String,
}

/// Outcome of a successful keyspace delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyspaceRemoval {
    pub keyspace: String,
    pub status: u16,
    pub body: String,
}

/// Provider clone-status document. Unknown fields are kept for display, and
/// the well-known fields accept any JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloneStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `Completed` and `Failed` are the only terminal states; matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneState {
    Completed,
    Failed,
    Running(String),
    Unknown,
}

/// Strings render bare, `null` counts as absent, anything else as compact JSON.
fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl CloneStatus {
    pub fn status_text(&self) -> Option<String> {
        field_text(self.status.as_ref())
    }

    pub fn phase_text(&self) -> Option<String> {
        field_text(self.phase.as_ref())
    }

    pub fn message_text(&self) -> Option<String> {
        field_text(self.message.as_ref())
    }

    /// Only the string values `Completed` and `Failed` are terminal.
    pub fn state(&self) -> CloneState {
        match &self.status {
            Some(Value::String(s)) if s == "Completed" => CloneState::Completed,
            Some(Value::String(s)) if s == "Failed" => CloneState::Failed,
            _ => match self.status_text() {
                Some(other) => CloneState::Running(other),
                None => CloneState::Unknown,
            },
        }
    }
}
