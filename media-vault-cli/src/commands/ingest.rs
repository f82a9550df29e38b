//! Local ingestion command
//!
//! Files are read from disk and handed to the same pipeline the HTTP
//! service uses, so they get the same validation, naming and audit entry.
//! The declared content type is always `application/octet-stream`. Files
//! larger than the upload limit are never read, only sized.

use anyhow::Result;
use console::{style, Emoji};
use media_vault::config::VaultConfig;
use media_vault::ingest::{BatchResponse, IncomingPart};
use media_vault::state::VaultState;
use media_vault::storage::UploadCandidate;
use std::fmt::Write;
use std::path::{Path, PathBuf};

static SUCCESS: Emoji = Emoji("✓", "√");
static FAILURE: Emoji = Emoji("✗", "x");

/// Source address recorded for files ingested from the command line
pub const LOCAL_SOURCE: &str = "local";

/// Ingest local files into the storage root
pub struct IngestCommand {
    config: VaultConfig,
    paths: Vec<PathBuf>,
}

impl IngestCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: VaultConfig, paths: Vec<PathBuf>) -> Self {
        Self { config, paths }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the storage root cannot be prepared or any file
    /// was rejected.
    pub async fn execute(self) -> Result<()> {
        let state = VaultState::new(self.config).await?;
        let response = ingest_paths(&state, &self.paths).await;

        print!("{}", render_batch(&response));
        if !response.errors.is_empty() {
            anyhow::bail!("{} file(s) were not ingested", response.errors.len());
        }
        Ok(())
    }
}

/// Run `paths` through the upload pipeline as one batch
pub async fn ingest_paths(state: &VaultState, paths: &[PathBuf]) -> BatchResponse {
    let max_file_size = state.config().uploads.max_file_size;
    let mut parts = Vec::with_capacity(paths.len());
    for path in paths {
        parts.push(read_part(path, max_file_size).await);
    }
    state.pipeline().ingest_batch(parts, LOCAL_SOURCE).await
}

async fn read_part(path: &Path, max_file_size: u64) -> IncomingPart {
    let declared_name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());

    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.len() > max_file_size => {
            return IncomingPart::Received(UploadCandidate::oversized(
                declared_name,
                "application/octet-stream",
                metadata.len(),
            ));
        }
        Ok(_) => {}
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot stat local file");
            return IncomingPart::transport_error(declared_name);
        }
    }

    match tokio::fs::read(path).await {
        Ok(data) => IncomingPart::Received(UploadCandidate::new(
            declared_name,
            "application/octet-stream",
            data,
        )),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "cannot read local file");
            IncomingPart::transport_error(declared_name)
        }
    }
}

/// Human readable batch result
#[must_use]
pub fn render_batch(response: &BatchResponse) -> String {
    let mut out = String::new();
    for success in &response.success {
        let _ = writeln!(
            out,
            "{} {} {} {} ({})",
            style(SUCCESS).green(),
            success.original_name,
            style("→").dim(),
            style(&success.saved_name).cyan(),
            success.size
        );
    }
    for error in &response.errors {
        let _ = writeln!(out, "{} {}", style(FAILURE).red(), error);
    }
    out
}
