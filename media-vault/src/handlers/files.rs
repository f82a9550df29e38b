//! Catalog, download and delete endpoints

use crate::catalog::CatalogEntry;
use crate::error::VaultError;
use crate::state::VaultState;
use crate::storage::{FileStorage, MimeValidator, NameSanitizer, StorageError};
use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Body of a successful delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always `true`
    pub success: bool,
}

/// `file=` parameter of the delete endpoint
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    /// Persisted name to delete
    pub file: Option<String>,
}

/// `GET /catalog`
pub async fn catalog(State(state): State<VaultState>) -> Result<Json<Vec<CatalogEntry>>, VaultError> {
    Ok(Json(state.catalog().build().await?))
}

/// `GET /files/{name}`
///
/// The content type comes from sniffing the stored bytes, never from the
/// name. Sniffed types outside the upload allow-list are served as
/// `application/octet-stream`.
pub async fn download(
    State(state): State<VaultState>,
    Path(name): Path<String>,
) -> Result<Response, VaultError> {
    let (record, data) = state.storage().open(&name).await?;

    let allowed = &state.config().uploads.allowed_mime_types;
    let content_type = MimeValidator::detect_mime(&data)
        .filter(|mime| allowed.iter().any(|a| a == mime))
        .unwrap_or("application/octet-stream");
    let filename = NameSanitizer::sanitize_component(NameSanitizer::strip_disambiguator(
        &record.persisted_name,
    ));
    let last_modified = httpdate::fmt_http_date(SystemTime::from(record.modified_at));

    tracing::debug!(saved_name = %record.persisted_name, content_type, "serving download");

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
            (header::LAST_MODIFIED, last_modified),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        data,
    )
        .into_response())
}

/// `DELETE /files/{name}`
pub async fn delete_file(
    State(state): State<VaultState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>, VaultError> {
    delete_named(&state, &name).await
}

/// `GET /delete?file=<name>`
pub async fn delete_by_query(
    State(state): State<VaultState>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteResponse>, VaultError> {
    delete_named(&state, params.file.as_deref().unwrap_or_default()).await
}

/// `POST /delete` with `file` in the query string or an urlencoded body
pub async fn delete_by_form(
    State(state): State<VaultState>,
    Query(query): Query<DeleteParams>,
    form: Result<Form<DeleteParams>, FormRejection>,
) -> Result<Json<DeleteResponse>, VaultError> {
    let name = query
        .file
        .or_else(|| form.ok().and_then(|Form(params)| params.file))
        .unwrap_or_default();
    delete_named(&state, &name).await
}

async fn delete_named(state: &VaultState, name: &str) -> Result<Json<DeleteResponse>, VaultError> {
    match state.storage().delete(name).await {
        Ok(()) => Ok(Json(DeleteResponse { success: true })),
        Err(err) => {
            if matches!(err, StorageError::InvalidPath(_)) {
                tracing::warn!(requested = %name, "delete outside storage root refused");
            }
            Err(err.into())
        }
    }
}
