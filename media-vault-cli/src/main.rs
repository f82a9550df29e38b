//! media-vault command line

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use media_vault_cli::{load_config, AuditCommand, CatalogCommand, IngestCommand, ServeCommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "media-vault")]
#[command(version)]
#[command(about = "Ingest, audit and catalog untrusted media uploads", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the standard search locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the upload HTTP service
    Serve,
    /// Print the catalog of stored files
    Catalog {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Run local files through the upload pipeline
    Ingest {
        /// Files to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show the most recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => ServeCommand::new(config).execute().await?,
        Commands::Catalog { json } => CatalogCommand::new(config, json).execute().await?,
        Commands::Ingest { paths } => IngestCommand::new(config, paths).execute().await?,
        Commands::Audit { limit } => AuditCommand::new(config, limit).execute().await?,
    }

    Ok(())
}
