//! HTTP surface
//!
//! | Route | Purpose |
//! |---|---|
//! | `POST /upload` | multipart upload batch, any other method is 405 |
//! | `GET /catalog` | catalog as JSON, newest first |
//! | `GET /files/{name}` | download a stored file |
//! | `DELETE /files/{name}` | delete a stored file |
//! | `GET`/`POST /delete?file=` | delete, query or form parameter |
//! | `GET /health` | liveness |
//!
//! Stored files are also downloadable under the public URL prefix
//! (`/uploads/{name}` by default) so the `url` of an upload resolves.

pub mod files;
pub mod uploads;

use crate::middleware::{SecurityHeadersConfig, SecurityHeadersLayer};
use crate::state::VaultState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Builds the application router
///
/// Serve it with connection info so uploads record the client address:
///
/// ```rust,no_run
/// # async fn example(state: media_vault::state::VaultState) -> anyhow::Result<()> {
/// let addr = state.config().server.bind_address();
/// let app = media_vault::handlers::router(state);
/// let listener = tokio::net::TcpListener::bind(addr).await?;
/// axum::serve(
///     listener,
///     app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub fn router(state: VaultState) -> Router {
    let config = state.config();
    let body_limit = config.uploads.request_body_limit();
    let timeout = Duration::from_secs(config.server.request_timeout_secs);
    let security = config.security.clone();
    let public_route = public_download_route(&config.storage.public_url_prefix);

    let mut app = Router::new()
        .route(
            "/upload",
            post(uploads::upload).fallback(uploads::invalid_method),
        )
        .route("/catalog", get(files::catalog))
        .route(
            "/files/{name}",
            get(files::download).delete(files::delete_file),
        )
        .route(
            "/delete",
            get(files::delete_by_query).post(files::delete_by_form),
        )
        .route("/health", get(health));

    if let Some(path) = public_route {
        app = app.route(&path, get(files::download));
    }

    let app = app
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if security.headers_enabled {
        app.layer(SecurityHeadersLayer::new(SecurityHeadersConfig::from_settings(
            &security,
        )))
    } else {
        app
    }
}

/// Download route under the public URL prefix
///
/// Only a single plain path segment qualifies; anything that would clash
/// with route syntax or an existing route is skipped with a warning.
fn public_download_route(prefix: &str) -> Option<String> {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return None;
    }

    let plain = prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    let reserved = matches!(prefix, "files" | "upload" | "catalog" | "delete" | "health");
    if !plain || reserved || prefix.starts_with('.') {
        tracing::warn!(
            public_url_prefix = %prefix,
            "public URL prefix is not a plain path segment, download route not mounted"
        );
        return None;
    }

    Some(format!("/{prefix}/{{name}}"))
}

/// Liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
