//! Upload pipeline: validate, name, persist, audit
//!
//! Every file in a batch gets its own verdict. A rejected or failed file is
//! reported in the batch's `errors` and never stops its siblings.

use crate::audit::{AuditLog, AuditLogEntry};
use crate::error::ErrorKind;
use crate::format::format_size;
use crate::storage::{
    FileStorage, NameSanitizer, UploadCandidate, UploadValidator, ValidationVerdict,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One file part as received from the client
#[derive(Debug, Clone)]
pub enum IncomingPart {
    /// Content arrived (possibly without its bytes when oversized)
    Received(UploadCandidate),
    /// The part could not be used at all
    Failed {
        /// Filename the client sent
        declared_name: String,
        /// Why it failed
        reason: ErrorKind,
        /// Message reported to the client
        detail: String,
    },
}

impl IncomingPart {
    /// A part whose stream broke off
    pub fn transport_error(declared_name: impl Into<String>) -> Self {
        let declared_name = declared_name.into();
        Self::Failed {
            detail: ErrorKind::TransportError.for_file(&declared_name),
            declared_name,
            reason: ErrorKind::TransportError,
        }
    }

    /// A part beyond the per-request file limit
    pub fn over_batch_limit(declared_name: impl Into<String>, limit: usize) -> Self {
        let declared_name = declared_name.into();
        Self::Failed {
            detail: format!(
                "{} (max {limit} per upload)",
                ErrorKind::TooManyFiles.for_file(&declared_name)
            ),
            declared_name,
            reason: ErrorKind::TooManyFiles,
        }
    }
}

/// A stored file as reported to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSuccess {
    /// Filename the client sent
    pub original_name: String,
    /// Name it was stored under
    pub saved_name: String,
    /// Size in human units
    pub size: String,
    /// Public URL
    pub url: String,
}

/// Result of one file going through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileVerdict {
    /// Stored and recorded in the audit log
    Stored(UploadSuccess),
    /// Stored, but the audit append failed; the file is kept
    StoredUnlogged {
        /// The stored file
        success: UploadSuccess,
        /// Always [`ErrorKind::LogWriteFailed`]
        reason: ErrorKind,
        /// Message reported to the client
        detail: String,
    },
    /// Not stored
    Rejected {
        /// Why
        reason: ErrorKind,
        /// Message reported to the client
        detail: String,
    },
}

/// Aggregated response for an upload request
///
/// Both arrays are always present in the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Files that were stored
    pub success: Vec<UploadSuccess>,
    /// One message per problem
    pub errors: Vec<String>,
}

impl BatchResponse {
    /// A response carrying a single request-level error
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Vec::new(),
            errors: vec![message.into()],
        }
    }

    /// Adds one file's verdict
    pub fn record(&mut self, verdict: FileVerdict) {
        match verdict {
            FileVerdict::Stored(success) => self.success.push(success),
            FileVerdict::StoredUnlogged { success, detail, .. } => {
                self.success.push(success);
                self.errors.push(detail);
            }
            FileVerdict::Rejected { detail, .. } => self.errors.push(detail),
        }
    }
}

/// Validates, stores and audits uploaded files
#[derive(Clone)]
pub struct UploadPipeline {
    validator: UploadValidator,
    storage: Arc<dyn FileStorage>,
    audit: AuditLog,
}

impl std::fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("validator", &self.validator)
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}

impl UploadPipeline {
    /// Wires a pipeline from its parts
    pub fn new(validator: UploadValidator, storage: Arc<dyn FileStorage>, audit: AuditLog) -> Self {
        Self {
            validator,
            storage,
            audit,
        }
    }

    /// Runs every part through the pipeline, in order
    ///
    /// `source` is the client address recorded in the audit log.
    pub async fn ingest_batch(&self, parts: Vec<IncomingPart>, source: &str) -> BatchResponse {
        let mut response = BatchResponse::default();

        if parts.is_empty() {
            return BatchResponse::failure(ErrorKind::NoFilesSupplied.message());
        }

        for part in parts {
            let verdict = match part {
                IncomingPart::Received(candidate) => self.ingest_file(candidate, source).await,
                IncomingPart::Failed {
                    declared_name,
                    reason,
                    detail,
                } => {
                    tracing::warn!(original_name = %declared_name, %reason, source, "upload part failed");
                    FileVerdict::Rejected { reason, detail }
                }
            };
            response.record(verdict);
        }

        tracing::info!(
            stored = response.success.len(),
            errors = response.errors.len(),
            source,
            "upload batch processed"
        );
        response
    }

    /// Runs one file through validation, naming, storage and the audit log
    pub async fn ingest_file(&self, candidate: UploadCandidate, source: &str) -> FileVerdict {
        let name = &candidate.declared_name;

        let sniffed_mime = match self.validator.validate(&candidate) {
            ValidationVerdict::Accepted { sniffed_mime } => sniffed_mime,
            ValidationVerdict::Rejected { reason, detail } => {
                tracing::warn!(
                    original_name = %name,
                    declared_mime = %candidate.declared_mime_type,
                    size = candidate.size,
                    %reason,
                    source,
                    "upload rejected"
                );
                return FileVerdict::Rejected { reason, detail };
            }
        };

        let persisted = NameSanitizer::sanitize(name);
        let stored = match self.storage.persist(&candidate, &persisted).await {
            Ok(stored) => stored,
            Err(err) => {
                tracing::error!(original_name = %name, error = %err, "failed to persist upload");
                return FileVerdict::Rejected {
                    reason: ErrorKind::MoveFailed,
                    detail: ErrorKind::MoveFailed.for_file(name),
                };
            }
        };

        tracing::info!(
            original_name = %name,
            saved_name = %stored.persisted_name,
            declared_mime = %candidate.declared_mime_type,
            sniffed_mime,
            size = candidate.size,
            source,
            "upload stored"
        );

        let success = UploadSuccess {
            original_name: name.clone(),
            saved_name: stored.persisted_name.clone(),
            size: format_size(candidate.size),
            url: self.storage.url(&stored.persisted_name),
        };

        let entry = AuditLogEntry::new(name.clone(), stored.persisted_name, candidate.size, source);
        match self.audit.append(&entry).await {
            Ok(()) => FileVerdict::Stored(success),
            Err(err) => {
                tracing::error!(
                    saved_name = %success.saved_name,
                    error = %err,
                    "failed to append audit log entry"
                );
                FileVerdict::StoredUnlogged {
                    reason: ErrorKind::LogWriteFailed,
                    detail: ErrorKind::LogWriteFailed.for_file(name),
                    success,
                }
            }
        }
    }
}
