//! Test helpers shared by the unit tests
//!
//! - [`fixtures`] - minimal media files and a throwaway configuration
//! - [`TestVault`] - a fully wired service backed by a temporary directory
//! - re-exported mockall for [`MockFileStorage`](crate::storage::MockFileStorage)

pub mod fixtures;
pub mod server;

pub use server::TestVault;

pub use mockall;
