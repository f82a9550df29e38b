//! File storage trait definitions

use super::naming::PersistedName;
use super::types::{StorageResult, StoredFileRecord, UploadCandidate};
use async_trait::async_trait;

/// Abstraction over the storage root
///
/// The pipeline and the catalog only talk to storage through this trait, so
/// failure paths can be exercised with a mock.
///
/// Implementations must:
/// - never make partially written content visible under a listed name
/// - never overwrite an existing file when persisting
/// - reject identifiers that do not name a file directly inside the root
///
/// # Examples
///
/// ```rust,no_run
/// use media_vault::config::StorageSettings;
/// use media_vault::storage::{FileStorage, LocalFileStorage, NameSanitizer, UploadCandidate};
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = LocalFileStorage::new(&StorageSettings::default()).await?;
///
/// let file = UploadCandidate::new("photo.png", "image/png", vec![/* ... */]);
/// let stored = storage.persist(&file, &NameSanitizer::sanitize(&file.declared_name)).await?;
/// println!("saved as {}", storage.url(&stored.persisted_name));
///
/// for record in storage.list().await? {
///     println!("{record}");
/// }
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes the candidate's content under `name` (or a disambiguated
    /// variant of it when that name is taken)
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be written or every name
    /// variant is already in use.
    async fn persist(
        &self,
        candidate: &UploadCandidate,
        name: &PersistedName,
    ) -> StorageResult<StoredFileRecord>;

    /// Enumerates the persisted files, in no particular order
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be read.
    async fn list(&self) -> StorageResult<Vec<StoredFileRecord>>;

    /// Removes a persisted file
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` for identifiers outside the root
    /// and `StorageError::NotFound` when the file does not exist.
    async fn delete(&self, persisted_name: &str) -> StorageResult<()>;

    /// Reads a persisted file and its metadata
    ///
    /// # Errors
    ///
    /// Same as [`FileStorage::delete`].
    async fn open(&self, persisted_name: &str) -> StorageResult<(StoredFileRecord, Vec<u8>)>;

    /// Checks whether a persisted file exists
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPath` for identifiers outside the root.
    async fn exists(&self, persisted_name: &str) -> StorageResult<bool>;

    /// Public URL of a persisted file
    fn url(&self, persisted_name: &str) -> String;
}
