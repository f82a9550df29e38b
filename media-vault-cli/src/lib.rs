//! media-vault CLI library

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

pub mod commands;

pub use commands::{AuditCommand, CatalogCommand, IngestCommand, ServeCommand};

use anyhow::{Context, Result};
use media_vault::config::VaultConfig;
use std::path::Path;

/// Service name used for config discovery and logging
pub const SERVICE_NAME: &str = "media-vault";

/// Load configuration from `path`, or from the standard locations
///
/// # Errors
///
/// Returns an error if a configuration source cannot be parsed.
pub fn load_config(path: Option<&Path>) -> Result<VaultConfig> {
    match path {
        Some(path) => {
            let display = path.display().to_string();
            VaultConfig::load_from(&display)
                .with_context(|| format!("Failed to load configuration from {display}"))
        }
        None => VaultConfig::load_for_service(SERVICE_NAME)
            .context("Failed to load configuration"),
    }
}
