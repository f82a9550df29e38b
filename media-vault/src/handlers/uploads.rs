//! Upload endpoint

use crate::error::ErrorKind;
use crate::extractors::{ClientAddress, UploadBatch};
use crate::ingest::BatchResponse;
use crate::state::VaultState;
use axum::{extract::State, http::Method, http::StatusCode, Json};

/// `POST /upload`
///
/// Always answers with both `success` and `errors`. Individual file
/// failures do not change the status code.
pub async fn upload(
    State(state): State<VaultState>,
    ClientAddress(source): ClientAddress,
    UploadBatch(parts): UploadBatch,
) -> (StatusCode, Json<BatchResponse>) {
    if parts.is_empty() {
        tracing::debug!(source = %source, "upload without file parts");
        return (
            StatusCode::BAD_REQUEST,
            Json(BatchResponse::failure(ErrorKind::NoFilesSupplied.message())),
        );
    }

    let response = state.pipeline().ingest_batch(parts, &source).await;
    (StatusCode::OK, Json(response))
}

/// Any method other than `POST` on `/upload`
pub async fn invalid_method(method: Method) -> (StatusCode, Json<BatchResponse>) {
    tracing::debug!(%method, "upload with invalid method");
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(BatchResponse::failure(ErrorKind::InvalidMethod.message())),
    )
}
