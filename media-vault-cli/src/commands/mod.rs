//! CLI command implementations

pub mod audit;
pub mod catalog;
pub mod ingest;
pub mod serve;

pub use audit::AuditCommand;
pub use catalog::CatalogCommand;
pub use ingest::IngestCommand;
pub use serve::ServeCommand;
