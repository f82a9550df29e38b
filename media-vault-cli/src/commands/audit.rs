//! Audit log command

use anyhow::Result;
use console::{style, Emoji};
use media_vault::audit::{AuditLog, AuditLogEntry};
use media_vault::config::VaultConfig;
use media_vault::format::format_size;
use std::fmt::Write;

static INFO: Emoji = Emoji("ℹ", "i");

/// Print the tail of the audit log
pub struct AuditCommand {
    config: VaultConfig,
    limit: usize,
}

impl AuditCommand {
    /// Create a new command instance
    #[must_use]
    pub const fn new(config: VaultConfig, limit: usize) -> Self {
        Self { config, limit }
    }

    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the audit log exists but cannot be read.
    pub async fn execute(self) -> Result<()> {
        let log = AuditLog::from_settings(&self.config.storage);
        let entries = log.recent(self.limit).await?;

        println!("\n{} {}", INFO, style(log.path().display()).bold());
        print!("{}", render_entries(&entries));
        Ok(())
    }
}

/// Human readable audit entries, oldest first
#[must_use]
pub fn render_entries(entries: &[AuditLogEntry]) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        let _ = writeln!(out, "  {}", style("(No uploads recorded)").dim());
        return out;
    }

    let _ = writeln!(
        out,
        "{:<26} {:<16} {:>10}  {:<28} {}",
        "Time", "Source", "Size", "Original", "Stored as"
    );
    let _ = writeln!(out, "{}", "─".repeat(100));
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<26} {:<16} {:>10}  {:<28} {}",
            entry.timestamp.to_rfc3339(),
            entry.source_address,
            format_size(entry.size),
            entry.original_name,
            style(&entry.persisted_name).dim()
        );
    }
    out
}
