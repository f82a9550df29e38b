//! Append-only audit log of successful uploads
//!
//! One JSON object per line in `upload_log.jsonl` inside the storage root:
//!
//! ```text
//! {"timestamp":"2024-03-09T12:00:00Z","original_name":"cat.png","saved_name":"1709985600_cat.png","size":2048,"ip":"203.0.113.7"}
//! ```
//!
//! Each append is a single `write_all` on a file opened in append mode,
//! performed while holding a mutex shared by every clone of the [`AuditLog`].
//! Concurrent uploads therefore never interleave or lose lines. Entries are
//! never rewritten or removed.

use crate::config::StorageSettings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Errors raised while writing or reading the audit log
#[derive(Debug, Error)]
pub enum AuditError {
    /// File could not be opened, written or read
    #[error("Audit log I/O error: {0}")]
    Io(#[from] io::Error),

    /// Entry could not be encoded
    #[error("Audit log encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One successful upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditLogEntry {
    /// When the file was stored
    pub timestamp: DateTime<Utc>,

    /// Filename as sent by the client
    pub original_name: String,

    /// Name the file was stored under
    #[serde(rename = "saved_name")]
    pub persisted_name: String,

    /// Size in bytes
    pub size: u64,

    /// Client address, or `unknown`
    #[serde(rename = "ip")]
    pub source_address: String,
}

impl AuditLogEntry {
    /// Creates an entry stamped with the current time
    pub fn new(
        original_name: impl Into<String>,
        persisted_name: impl Into<String>,
        size: u64,
        source_address: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            original_name: original_name.into(),
            persisted_name: persisted_name.into(),
            size,
            source_address: source_address.into(),
        }
    }
}

/// Handle to the audit log file
///
/// Cloning is cheap and clones share the same writer lock.
///
/// ```rust,no_run
/// use media_vault::audit::{AuditLog, AuditLogEntry};
///
/// # async fn example() -> anyhow::Result<()> {
/// let log = AuditLog::new("./uploads/upload_log.jsonl");
/// log.append(&AuditLogEntry::new("cat.png", "1700000000_cat.png", 2048, "203.0.113.7"))
///     .await?;
///
/// for entry in log.recent(10).await? {
///     println!("{} {}", entry.timestamp, entry.persisted_name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    writer: Arc<Mutex<()>>,
}

impl AuditLog {
    /// Audit log at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Audit log inside the configured storage root
    #[must_use]
    pub fn from_settings(settings: &StorageSettings) -> Self {
        Self::new(settings.audit_log_path())
    }

    /// Location of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single line
    pub async fn append(&self, entry: &AuditLogEntry) -> Result<(), AuditError> {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.writer.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }

    /// Every readable entry, oldest first
    ///
    /// A missing log file is an empty log. Lines that do not parse are
    /// skipped with a warning.
    pub async fn read_all(&self) -> Result<Vec<AuditLogEntry>, AuditError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let entries = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        line = index + 1,
                        error = %err,
                        "skipping malformed audit log line"
                    );
                    None
                }
            })
            .collect();

        Ok(entries)
    }

    /// The last `limit` entries, oldest first
    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditLogEntry>, AuditError> {
        let mut entries = self.read_all().await?;
        let skip = entries.len().saturating_sub(limit);
        entries.drain(..skip);
        Ok(entries)
    }
}
