//! Test server utilities using axum-test

use super::fixtures;
use crate::config::VaultConfig;
use crate::handlers;
use crate::state::VaultState;
use std::path::Path;
use tempfile::TempDir;

/// A complete service over a temporary storage root
///
/// The directory is removed when the value is dropped.
///
/// ```rust,ignore
/// let vault = TestVault::new().await?;
/// vault.store("1700000000_cat.png", fixtures::PNG);
/// vault.get("/catalog").await.assert_status_ok();
/// ```
pub struct TestVault {
    inner: axum_test::TestServer,
    state: VaultState,
    _dir: TempDir,
}

impl TestVault {
    /// Default configuration rooted in a fresh temporary directory
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(|_| {}).await
    }

    /// Like [`TestVault::new`] with configuration adjustments
    pub async fn with_config(configure: impl FnOnce(&mut VaultConfig)) -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let mut config = fixtures::config_in(dir.path());
        configure(&mut config);

        let state = VaultState::new(config).await?;
        let inner = axum_test::TestServer::new(handlers::router(state.clone()))?;
        Ok(Self {
            inner,
            state,
            _dir: dir,
        })
    }

    /// Shared application state
    pub const fn state(&self) -> &VaultState {
        &self.state
    }

    /// Storage root
    pub fn root(&self) -> &Path {
        &self.state.config().storage.root
    }

    /// Places a file directly in the storage root
    pub fn store(&self, persisted_name: &str, content: &[u8]) {
        std::fs::write(self.root().join(persisted_name), content)
            .unwrap_or_else(|err| panic!("failed to write {persisted_name}: {err}"));
    }

    /// Make a GET request to the server
    pub fn get(&self, path: &str) -> axum_test::TestRequest {
        self.inner.get(path)
    }

    /// Make a POST request to the server
    pub fn post(&self, path: &str) -> axum_test::TestRequest {
        self.inner.post(path)
    }

    /// Make a DELETE request to the server
    pub fn delete(&self, path: &str) -> axum_test::TestRequest {
        self.inner.delete(path)
    }

    /// Get the inner `axum_test::TestServer` for advanced usage
    pub const fn inner(&self) -> &axum_test::TestServer {
        &self.inner
    }
}
