use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to {action}: HTTP {status}: {body}")]
    ApiStatus {
        action: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("No snapshots found for database {0}")]
    NoSnapshots(String),

    #[error("No keyspaces found for database {0}")]
    NoKeyspaces(String),

    #[error("operationID is missing from the clone response: {0}")]
    MissingOperationId(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Clone operation {0} failed")]
    CloneFailed(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
