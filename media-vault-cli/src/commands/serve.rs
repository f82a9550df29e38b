//! HTTP service command

use anyhow::{Context, Result};
use console::style;
use media_vault::config::VaultConfig;
use media_vault::state::VaultState;
use std::net::SocketAddr;

/// Serve the upload router until the process is stopped
pub struct ServeCommand {
    config: VaultConfig,
}

impl ServeCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if logging cannot be initialized, the storage root
    /// cannot be prepared or the listener cannot bind.
    pub async fn execute(self) -> Result<()> {
        media_vault::observability::init()?;

        let addr = self.config.server.bind_address();
        let state = VaultState::new(self.config)
            .await
            .context("Failed to prepare storage root")?;

        println!(
            "{} {} {}",
            style("Serving").green().bold(),
            style(state.config().storage.root.display()).cyan(),
            style(format!("on http://{addr}")).bold()
        );
        tracing::info!(
            service = %state.observability().service_name,
            %addr,
            root = %state.config().storage.root.display(),
            "media vault listening"
        );

        let app = media_vault::handlers::router(state);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server exited with error")?;

        tracing::info!("media vault stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
