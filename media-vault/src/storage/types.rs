//! Core types for file storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during file storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// File not found in storage
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error during storage operation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Identifier does not name a file directly inside the storage root
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Every disambiguated variant of a name was already taken
    #[error("No free name for {name} after {attempts} attempts")]
    NameExhausted {
        /// Base name that kept colliding
        name: String,
        /// Attempts made
        attempts: u32,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file received from a client, not yet validated or stored
///
/// `size` is the number of bytes the client sent. When a part exceeds the
/// size limit its content is not buffered, so `size` can be larger than
/// `data.len()`.
///
/// ```rust
/// use media_vault::storage::UploadCandidate;
///
/// let file = UploadCandidate::new("photo.PNG", "image/png", vec![0x89, 0x50, 0x4E, 0x47]);
/// assert_eq!(file.size, 4);
/// assert_eq!(file.extension(), "png");
/// ```
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    /// Filename as sent by the client
    pub declared_name: String,

    /// Content type as sent by the client (logged, never trusted)
    pub declared_mime_type: String,

    /// Bytes received for this part
    pub size: u64,

    /// File content
    pub data: Vec<u8>,
}

impl UploadCandidate {
    /// Creates a candidate whose content was fully received
    #[must_use]
    pub fn new(
        declared_name: impl Into<String>,
        declared_mime_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            declared_name: declared_name.into(),
            declared_mime_type: declared_mime_type.into(),
            size: data.len() as u64,
            data,
        }
    }

    /// Creates a candidate whose content was dropped because it exceeded the
    /// size limit while streaming
    #[must_use]
    pub fn oversized(
        declared_name: impl Into<String>,
        declared_mime_type: impl Into<String>,
        size: u64,
    ) -> Self {
        Self {
            declared_name: declared_name.into(),
            declared_mime_type: declared_mime_type.into(),
            size,
            data: Vec::new(),
        }
    }

    /// Lower-cased extension of the declared name, empty when there is none
    #[must_use]
    pub fn extension(&self) -> String {
        extension_of(&self.declared_name)
    }
}

/// Lower-cased text after the last `.` of the final path segment
///
/// ```rust
/// use media_vault::storage::extension_of;
///
/// assert_eq!(extension_of("archive.tar.GZ"), "gz");
/// assert_eq!(extension_of("README"), "");
/// assert_eq!(extension_of("../up/shell.php"), "php");
/// ```
#[must_use]
pub fn extension_of(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// A persisted file as discovered by listing the storage root
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFileRecord {
    /// Name inside the storage root
    pub persisted_name: String,

    /// Filesystem path
    pub path: PathBuf,

    /// Size in bytes at enumeration time
    pub size: u64,

    /// Last modification time at enumeration time
    pub modified_at: DateTime<Utc>,
}

impl fmt::Display for StoredFileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StoredFileRecord(name={}, size={})",
            self.persisted_name, self.size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_size_matches_data() {
        let file = UploadCandidate::new("a.gif", "image/gif", vec![1, 2, 3, 4, 5]);
        assert_eq!(file.size, 5);
    }

    #[test]
    fn test_oversized_candidate_keeps_reported_size() {
        let file = UploadCandidate::oversized("big.mp4", "video/mp4", 60 * 1024 * 1024);
        assert_eq!(file.size, 60 * 1024 * 1024);
        assert!(file.data.is_empty());
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension_of("document.PDF"), "pdf");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of("trailing."), "");
        assert_eq!(extension_of(".htaccess"), "htaccess");
        assert_eq!(extension_of("dir.d/noext"), "");
        assert_eq!(extension_of("C:\\temp\\x.Php5"), "php5");
    }

    #[test]
    fn test_record_display() {
        let record = StoredFileRecord {
            persisted_name: "1700000000_cat.png".into(),
            path: PathBuf::from("/srv/1700000000_cat.png"),
            size: 1024,
            modified_at: Utc::now(),
        };
        let display = record.to_string();
        assert!(display.contains("1700000000_cat.png"));
        assert!(display.contains("1024"));
    }
}
