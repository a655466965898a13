// snapclone/src/clone/progress_log.rs
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::api::CloneStatus;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// `clone_<operationID>.txt` inside `log_dir`. Characters that would escape the
/// directory or upset a filesystem are replaced with `_`.
pub fn log_path(log_dir: &Path, operation_id: &str) -> PathBuf {
    let safe: String = operation_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    log_dir.join(format!("clone_{}.txt", safe))
}

/// `<timestamp> - <phase> - <status> - <message>`, absent fields rendered as `None`.
pub fn format_status_line(timestamp: &str, status: &CloneStatus) -> String {
    let field = |value: Option<String>| value.unwrap_or_else(|| "None".to_string());
    format!(
        "{} - {} - {} - {}",
        timestamp,
        field(status.phase_text()),
        field(status.status_text()),
        field(status.message_text())
    )
}

/// Creates (or truncates) the operation's log file with the start record.
pub fn write_start_record(log_dir: &Path, operation_id: &str) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
    let path = log_path(log_dir, operation_id);
    let mut file = File::create(&path)
        .with_context(|| format!("Failed to create clone log file: {}", path.display()))?;
    writeln!(
        file,
        "[{}] Clone operation started successfully. OperationID: {}",
        timestamp(),
        operation_id
    )
    .with_context(|| format!("Failed to write clone log file: {}", path.display()))?;
    Ok(path)
}

/// Append-only progress log, flushed after every line.
#[derive(Debug)]
pub struct ProgressLog {
    file: File,
    path: PathBuf,
}

impl ProgressLog {
    pub fn open_append(log_dir: &Path, operation_id: &str) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;
        let path = log_path(log_dir, operation_id);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open clone log file: {}", path.display()))?;
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, line: &str) -> Result<()> {
        writeln!(self.file, "{}", line)
            .and_then(|_| self.file.flush())
            .with_context(|| format!("Failed to append to clone log file: {}", self.path.display()))
    }
}
