//! Catalog listing command

use anyhow::Result;
use console::style;
use media_vault::catalog::CatalogEntry;
use media_vault::config::VaultConfig;
use media_vault::state::VaultState;
use std::fmt::Write;

/// Print every stored file, newest first
pub struct CatalogCommand {
    config: VaultConfig,
    json: bool,
}

impl CatalogCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: VaultConfig, json: bool) -> Self {
        Self { config, json }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the storage root cannot be listed.
    pub async fn execute(self) -> Result<()> {
        let json = self.json;
        let state = VaultState::new(self.config).await?;
        let entries = state.catalog().build().await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            print!("{}", render_table(&entries));
        }
        Ok(())
    }
}

/// Human readable catalog table
#[must_use]
pub fn render_table(entries: &[CatalogEntry]) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        let _ = writeln!(out, "  {}", style("(No files stored)").dim());
        return out;
    }

    let _ = writeln!(
        out,
        "{:<32} {:<6} {:>10}  {:<20} {}",
        "Name", "Type", "Size", "Modified", "Stored as"
    );
    let _ = writeln!(out, "{}", "─".repeat(100));
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<32} {:<6} {:>10}  {:<20} {}",
            entry.display_name,
            entry.media_type.to_string(),
            entry.formatted_size,
            entry.formatted_date,
            style(&entry.persisted_name).dim()
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{} file(s)", style(entries.len()).bold());
    out
}
