//! File storage: validation, naming and persistence of uploads
//!
//! - [`validation`] sniffs content and classifies names
//! - [`naming`] turns client filenames into safe persisted names
//! - [`policy`] decides whether a candidate may be stored
//! - [`FileStorage`] persists, lists, reads and deletes files
//!
//! # Examples
//!
//! ```rust,no_run
//! use media_vault::config::VaultConfig;
//! use media_vault::storage::{
//!     FileStorage, LocalFileStorage, NameSanitizer, UploadCandidate, UploadValidator,
//!     ValidationVerdict,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = VaultConfig::default();
//! let validator = UploadValidator::from_settings(&config.uploads);
//! let storage = LocalFileStorage::new(&config.storage).await?;
//!
//! let file = UploadCandidate::new("photo.png", "image/png", vec![/* ... */]);
//! if let ValidationVerdict::Accepted { .. } = validator.validate(&file) {
//!     let name = NameSanitizer::sanitize(&file.declared_name);
//!     let stored = storage.persist(&file, &name).await?;
//!     println!("stored at {}", storage.url(&stored.persisted_name));
//! }
//! # Ok(())
//! # }
//! ```

pub mod local;
pub mod naming;
pub mod policy;
pub mod traits;
pub mod types;
pub mod validation;

pub use local::LocalFileStorage;
pub use naming::{NameSanitizer, PersistedName};
pub use policy::{UploadValidator, UploadValidatorBuilder, ValidationVerdict};
pub use traits::FileStorage;
pub use types::{extension_of, StorageError, StorageResult, StoredFileRecord, UploadCandidate};
pub use validation::{classify_by_extension, MediaType, MimeValidator, MimeVerdict};

#[cfg(test)]
pub use traits::MockFileStorage;
