//! media-vault: ingestion and cataloging of untrusted media uploads
//!
//! Files arrive from clients with a name and a declared content type that
//! cannot be trusted. Every file is checked against a size limit, an
//! executable-extension denylist and its sniffed (magic number) content type
//! before it is persisted under a sanitized, collision-free name. Successful
//! uploads are recorded in an append-only audit log. The catalog is derived
//! from the storage directory on every read; there is no separate index.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use media_vault::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     media_vault::observability::init()?;
//!
//!     let config = VaultConfig::load_for_service("media-vault")?;
//!     let state = VaultState::new(config).await?;
//!     let addr = state.config().server.bind_address();
//!
//!     let app = media_vault::handlers::router(state);
//!     let listener = tokio::net::TcpListener::bind(addr).await?;
//!     axum::serve(
//!         listener,
//!         app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
//!     )
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! An upload batch flows through
//! [`UploadValidator`](storage::UploadValidator) →
//! [`NameSanitizer`](storage::NameSanitizer) →
//! [`FileStorage`](storage::FileStorage) →
//! [`AuditLog`](audit::AuditLog), one verdict per file. A catalog request
//! flows [`FileStorage::list`](storage::FileStorage::list) →
//! [`Catalog`](catalog::Catalog).

#![allow(clippy::missing_errors_doc)]

pub mod audit;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractors;
pub mod format;
pub mod handlers;
pub mod ingest;
pub mod middleware;
pub mod observability;
pub mod state;
pub mod storage;

#[cfg(test)]
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! ```rust
    //! use media_vault::prelude::*;
    //! ```

    pub use crate::audit::{AuditError, AuditLog, AuditLogEntry};
    pub use crate::catalog::{Catalog, CatalogEntry};
    pub use crate::config::VaultConfig;
    pub use crate::error::{ErrorKind, VaultError};
    pub use crate::extractors::{ClientAddress, IncomingPart, UploadBatch};
    pub use crate::format::format_size;
    pub use crate::ingest::{BatchResponse, UploadPipeline, UploadSuccess};
    pub use crate::state::VaultState;
    pub use crate::storage::{
        classify_by_extension, FileStorage, LocalFileStorage, MediaType, MimeValidator,
        MimeVerdict, NameSanitizer, PersistedName, StorageError, StoredFileRecord,
        UploadCandidate, UploadValidator, ValidationVerdict,
    };

    pub use axum;
    pub use serde_json::json;
}
