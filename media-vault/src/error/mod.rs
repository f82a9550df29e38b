//! Error types and error handling

use crate::storage::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a single file (or a whole request) was not accepted
///
/// These are values carried in verdicts and batch results, never panics or
/// early returns: one failing file does not abort its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// File exceeds the configured size limit
    TooLarge,
    /// Extension is one the web server would execute
    DangerousExtension,
    /// Sniffed content is not an allowed media type
    TypeMismatch,
    /// The file part did not arrive intact
    TransportError,
    /// Persisting into the storage root failed
    MoveFailed,
    /// Request used a method other than POST
    InvalidMethod,
    /// Request contained no file parts
    NoFilesSupplied,
    /// File was stored but the audit append failed
    LogWriteFailed,
    /// Referenced stored file does not exist
    NotFound,
    /// Identifier does not resolve to a name inside the storage root
    InvalidName,
    /// Batch carried more file parts than allowed
    TooManyFiles,
}

impl ErrorKind {
    /// Client-facing message
    ///
    /// Per-file verdicts append the file name (and limit) to this text.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::TooLarge => "File too large",
            Self::DangerousExtension => "Dangerous file type",
            Self::TypeMismatch => "Invalid file type",
            Self::TransportError => "Upload error for",
            Self::MoveFailed => "Failed to move uploaded file",
            Self::InvalidMethod => "Invalid request method",
            Self::NoFilesSupplied => "No files uploaded",
            Self::LogWriteFailed => "Failed to write upload log for",
            Self::NotFound => "File not found",
            Self::InvalidName => "Invalid file name",
            Self::TooManyFiles => "Too many files, skipped",
        }
    }

    /// Message naming one file, `"<message>: <name>"`
    #[must_use]
    pub fn for_file(self, name: &str) -> String {
        format!("{}: {name}", self.message())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TooLarge => "too large",
            Self::DangerousExtension => "dangerous extension",
            Self::TypeMismatch => "type mismatch",
            Self::TransportError => "transport error",
            Self::MoveFailed => "move failed",
            Self::InvalidMethod => "invalid method",
            Self::NoFilesSupplied => "no files supplied",
            Self::LogWriteFailed => "log write failed",
            Self::NotFound => "not found",
            Self::InvalidName => "invalid name",
            Self::TooManyFiles => "too many files",
        };
        f.write_str(label)
    }
}

/// Service-level error type
#[derive(Debug, Error)]
pub enum VaultError {
    /// Storage root error
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl VaultError {
    /// Maps the error onto the taxonomy used in API responses
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(StorageError::NotFound(_)) => ErrorKind::NotFound,
            Self::Storage(StorageError::InvalidPath(_)) => ErrorKind::InvalidName,
            Self::Storage(_) => ErrorKind::MoveFailed,
        }
    }

    const fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidName => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body used for every non-batch failure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `false`
    pub success: bool,
    /// Human readable reason
    pub error: String,
}

impl ErrorBody {
    /// Builds a failure body from a message
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

impl IntoResponse for VaultError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let not_found = VaultError::from(StorageError::NotFound("a.png".into()));
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let invalid = VaultError::from(StorageError::InvalidPath("../x".into()));
        assert_eq!(invalid.kind(), ErrorKind::InvalidName);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let io = VaultError::from(StorageError::Io(std::io::Error::other("disk")));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ErrorKind::InvalidMethod.message(), "Invalid request method");
        assert_eq!(ErrorKind::NoFilesSupplied.message(), "No files uploaded");
        assert_eq!(ErrorKind::LogWriteFailed.message(), "Failed to write upload log for");
        assert_eq!(ErrorKind::MoveFailed.message(), "Failed to move uploaded file");
        assert_eq!(ErrorKind::TypeMismatch.for_file("a.jpg"), "Invalid file type: a.jpg");
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::DangerousExtension).unwrap();
        assert_eq!(json, "\"dangerous_extension\"");
    }
}
