//! Application state management
//!
//! Everything a handler needs, built once from a [`VaultConfig`] and shared
//! across requests by cheap clones.

use crate::audit::AuditLog;
use crate::catalog::Catalog;
use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::ingest::UploadPipeline;
use crate::observability::ObservabilityConfig;
use crate::storage::{FileStorage, LocalFileStorage, UploadValidator};
use std::sync::Arc;

/// Application state for media-vault
///
/// # Example
///
/// ```rust,no_run
/// use media_vault::{config::VaultConfig, state::VaultState};
///
/// # async fn example() -> anyhow::Result<()> {
/// let state = VaultState::new(VaultConfig::load_for_service("media-vault")?).await?;
///
/// let app: axum::Router = axum::Router::new()
///     .route("/", axum::routing::get(|| async { "Hello!" }))
///     .with_state(state);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct VaultState {
    /// Application configuration
    config: Arc<VaultConfig>,

    /// Observability configuration
    observability: Arc<ObservabilityConfig>,

    storage: Arc<dyn FileStorage>,
    audit: AuditLog,
    pipeline: UploadPipeline,
    catalog: Catalog,
}

impl std::fmt::Debug for VaultState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultState")
            .field("config", &self.config)
            .field("observability", &self.observability)
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}

impl VaultState {
    /// Opens the configured storage root and wires every component
    ///
    /// # Errors
    ///
    /// Returns an error if the storage root cannot be created or is not a
    /// directory.
    pub async fn new(config: VaultConfig) -> Result<Self, VaultError> {
        let storage = LocalFileStorage::new(&config.storage).await?;
        tracing::info!(root = %storage.root().display(), "storage root ready");
        Ok(Self::with_storage(config, Arc::new(storage)))
    }

    /// Wires every component around an existing storage backend
    #[must_use]
    pub fn with_storage(config: VaultConfig, storage: Arc<dyn FileStorage>) -> Self {
        let audit = AuditLog::from_settings(&config.storage);
        let pipeline = UploadPipeline::new(
            UploadValidator::from_settings(&config.uploads),
            Arc::clone(&storage),
            audit.clone(),
        );
        let catalog = Catalog::new(Arc::clone(&storage), config.catalog.clone());

        Self {
            config: Arc::new(config),
            observability: Arc::new(ObservabilityConfig::default()),
            storage,
            audit,
            pipeline,
            catalog,
        }
    }

    /// Get configuration reference
    #[must_use]
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Get observability configuration
    #[must_use]
    pub fn observability(&self) -> &ObservabilityConfig {
        &self.observability
    }

    /// Storage backend
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn FileStorage> {
        &self.storage
    }

    /// Audit log
    #[must_use]
    pub const fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Upload pipeline
    #[must_use]
    pub const fn pipeline(&self) -> &UploadPipeline {
        &self.pipeline
    }

    /// Catalog builder
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
