//! Multipart upload batch extractor
//!
//! Every multipart part that carries a non-empty filename becomes one
//! [`IncomingPart`]; plain form fields are ignored. Parts are streamed chunk
//! by chunk: once a part exceeds the configured file size its content is
//! dropped, but its bytes keep being counted so the validator can report
//! the real size.
//!
//! # Examples
//!
//! ```rust,no_run
//! use media_vault::extractors::{ClientAddress, UploadBatch};
//! use media_vault::state::VaultState;
//! use axum::{extract::State, Json};
//!
//! async fn upload(
//!     State(state): State<VaultState>,
//!     ClientAddress(source): ClientAddress,
//!     UploadBatch(parts): UploadBatch,
//! ) -> Json<media_vault::ingest::BatchResponse> {
//!     Json(state.pipeline().ingest_batch(parts, &source).await)
//! }
//! ```

use crate::error::ErrorKind;
use crate::ingest::{BatchResponse, IncomingPart};
use crate::state::VaultState;
use crate::storage::UploadCandidate;
use axum::{
    extract::{multipart::Field, FromRef, FromRequest, Multipart, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;

/// All file parts of one upload request, in the order they were sent
#[derive(Debug)]
pub struct UploadBatch(pub Vec<IncomingPart>);

/// The request is not a multipart upload
#[derive(Debug)]
pub struct UploadBatchRejection {
    reason: String,
}

impl fmt::Display for UploadBatchRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Not a multipart upload: {}", self.reason)
    }
}

impl std::error::Error for UploadBatchRejection {}

impl IntoResponse for UploadBatchRejection {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self.reason, "rejected non-multipart upload");
        (
            StatusCode::BAD_REQUEST,
            Json(BatchResponse::failure(ErrorKind::NoFilesSupplied.message())),
        )
            .into_response()
    }
}

impl<S> FromRequest<S> for UploadBatch
where
    S: Send + Sync,
    VaultState: FromRef<S>,
{
    type Rejection = UploadBatchRejection;

    #[allow(clippy::manual_async_fn)]
    fn from_request(
        req: Request,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let vault = VaultState::from_ref(state);
            let max_file_size = vault.config().uploads.max_file_size;
            let max_files = vault.config().uploads.max_files_per_batch;

            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|err| UploadBatchRejection {
                    reason: err.body_text(),
                })?;

            let mut parts = Vec::new();
            loop {
                let field = match multipart.next_field().await {
                    Ok(Some(field)) => field,
                    Ok(None) => break,
                    Err(err) => {
                        tracing::warn!(error = %err, "malformed multipart body");
                        break;
                    }
                };

                let Some(declared_name) = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned)
                else {
                    continue;
                };

                if parts.len() >= max_files {
                    parts.push(IncomingPart::over_batch_limit(declared_name, max_files));
                    continue;
                }

                let part = read_part(field, declared_name, max_file_size).await;
                let broken = matches!(
                    part,
                    IncomingPart::Failed {
                        reason: ErrorKind::TransportError,
                        ..
                    }
                );
                parts.push(part);
                if broken {
                    break;
                }
            }

            Ok(Self(parts))
        }
    }
}

/// Streams one file part, buffering at most `max_file_size` bytes
async fn read_part(mut field: Field<'_>, declared_name: String, max_file_size: u64) -> IncomingPart {
    let declared_mime = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut data = Vec::new();
    let mut size: u64 = 0;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                size = size.saturating_add(chunk.len() as u64);
                if size > max_file_size {
                    data = Vec::new();
                } else {
                    data.extend_from_slice(&chunk);
                }
            }
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(original_name = %declared_name, error = %err, "upload part broke off");
                return IncomingPart::transport_error(declared_name);
            }
        }
    }

    if size > max_file_size {
        IncomingPart::Received(UploadCandidate::oversized(declared_name, declared_mime, size))
    } else {
        IncomingPart::Received(UploadCandidate::new(declared_name, declared_mime, data))
    }
}
