//! Local filesystem storage implementation

use super::naming::PersistedName;
use super::traits::FileStorage;
use super::types::{StorageError, StorageResult, StoredFileRecord, UploadCandidate};
use crate::config::StorageSettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Prefix of in-flight temporary files inside the root
pub const TEMP_PREFIX: &str = ".incoming-";

/// Disambiguated names tried before giving up on a persist
pub const MAX_NAME_ATTEMPTS: u32 = 100;

/// Local filesystem storage backend
///
/// All files live directly in one flat directory next to the access-control
/// marker and the audit log:
///
/// ```text
/// uploads/
/// ├── .htaccess
/// ├── upload_log.jsonl
/// ├── 1700000000_cat.png
/// └── 17000000001_cat.png
/// ```
///
/// Content is first written to a hidden `.incoming-<uuid>` file and then
/// hard-linked under its final name. Linking fails when the name exists, so
/// two concurrent uploads can never overwrite each other and a reader never
/// sees a half-written file under a listed name.
///
/// # Examples
///
/// ```rust,no_run
/// use media_vault::config::StorageSettings;
/// use media_vault::storage::{FileStorage, LocalFileStorage};
///
/// # async fn example() -> anyhow::Result<()> {
/// // creates ./uploads and its .htaccess marker if missing
/// let storage = LocalFileStorage::new(&StorageSettings::default()).await?;
/// println!("{} files stored", storage.list().await?.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    public_url_prefix: String,
    marker_file: String,
    audit_log_file: String,
}

impl LocalFileStorage {
    /// Opens the storage root, creating it and its access-control marker
    /// when missing
    ///
    /// # Errors
    ///
    /// Returns an error if the root exists but is not a directory, or it
    /// cannot be created.
    pub async fn new(settings: &StorageSettings) -> StorageResult<Self> {
        let root = settings.root.clone();

        match fs::metadata(&root).await {
            Ok(metadata) if !metadata.is_dir() => {
                return Err(StorageError::InvalidPath(format!(
                    "{} is not a directory",
                    root.display()
                )));
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&root).await?;
                tracing::info!(root = %root.display(), "created storage root");
            }
            Err(err) => return Err(err.into()),
        }

        let marker = root.join(&settings.marker_file);
        if !fs::try_exists(&marker).await? {
            fs::write(&marker, settings.marker_contents.as_bytes()).await?;
            tracing::debug!(marker = %marker.display(), "wrote access-control marker");
        }

        Ok(Self {
            root,
            public_url_prefix: settings.public_url_prefix.clone(),
            marker_file: settings.marker_file.clone(),
            audit_log_file: settings.audit_log_file.clone(),
        })
    }

    /// Directory holding the persisted files
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Marker and audit log share the root but are never catalog entries
    fn is_reserved(&self, name: &str) -> bool {
        name == self.marker_file || name == self.audit_log_file
    }

    /// Maps an identifier onto a path directly inside the root
    fn resolve(&self, persisted_name: &str) -> StorageResult<PathBuf> {
        let invalid = || StorageError::InvalidPath(persisted_name.to_string());

        if persisted_name.is_empty()
            || persisted_name.starts_with('.')
            || persisted_name.contains(['/', '\\', '\0'])
            || self.is_reserved(persisted_name)
        {
            return Err(invalid());
        }

        let mut components = Path::new(persisted_name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(persisted_name)),
            _ => Err(invalid()),
        }
    }

    /// Metadata of a regular file inside the root; anything else is `NotFound`
    async fn regular_file(&self, persisted_name: &str) -> StorageResult<(PathBuf, std::fs::Metadata)> {
        let path = self.resolve(persisted_name)?;
        let metadata = fs::symlink_metadata(&path)
            .await
            .map_err(|err| not_found_or_io(err, persisted_name))?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(persisted_name.to_string()));
        }
        Ok((path, metadata))
    }

    /// Links the temporary file under the first free variant of `name`
    async fn link_into_place(
        &self,
        temp: &Path,
        name: &PersistedName,
    ) -> StorageResult<(String, PathBuf)> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = name.render(attempt);
            let target = self.root.join(&candidate);

            match fs::hard_link(temp, &target).await {
                Ok(()) => return Ok((candidate, target)),
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::debug!(name = %candidate, attempt, "name taken, retrying");
                }
                Err(err) if err.kind() == io::ErrorKind::Unsupported => {
                    // no hard links on this filesystem
                    match copy_no_clobber(temp, &target).await {
                        Ok(()) => return Ok((candidate, target)),
                        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                            tracing::debug!(name = %candidate, attempt, "name taken, retrying");
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(StorageError::NameExhausted {
            name: name.base().to_string(),
            attempts: MAX_NAME_ATTEMPTS,
        })
    }
}

async fn write_temp(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}

/// Copies `temp` to `target`, failing with `AlreadyExists` if `target` exists
async fn copy_no_clobber(temp: &Path, target: &Path) -> io::Result<()> {
    let mut dest = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .await?;

    let copied = async {
        let mut source = fs::File::open(temp).await?;
        tokio::io::copy(&mut source, &mut dest).await?;
        dest.sync_all().await
    }
    .await;

    if let Err(err) = copied {
        drop(dest);
        if let Err(cleanup) = fs::remove_file(target).await {
            tracing::warn!(target = %target.display(), error = %cleanup, "failed to remove partial copy");
        }
        return Err(err);
    }
    Ok(())
}

fn not_found_or_io(err: io::Error, persisted_name: &str) -> StorageError {
    if err.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound(persisted_name.to_string())
    } else {
        StorageError::Io(err)
    }
}

fn record(persisted_name: String, path: PathBuf, metadata: &std::fs::Metadata) -> StoredFileRecord {
    StoredFileRecord {
        persisted_name,
        path,
        size: metadata.len(),
        modified_at: metadata
            .modified()
            .map_or(DateTime::<Utc>::UNIX_EPOCH, DateTime::<Utc>::from),
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn persist(
        &self,
        candidate: &UploadCandidate,
        name: &PersistedName,
    ) -> StorageResult<StoredFileRecord> {
        let temp = self.root.join(format!("{TEMP_PREFIX}{}", Uuid::new_v4()));

        if let Err(err) = write_temp(&temp, &candidate.data).await {
            if let Err(cleanup) = fs::remove_file(&temp).await {
                tracing::warn!(temp = %temp.display(), error = %cleanup, "failed to remove temp file");
            }
            return Err(err.into());
        }

        let linked = self.link_into_place(&temp, name).await;

        match fs::remove_file(&temp).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(temp = %temp.display(), error = %err, "failed to remove temp file");
            }
        }

        let (persisted_name, path) = linked?;
        let metadata = fs::metadata(&path).await?;
        tracing::debug!(saved_name = %persisted_name, size = metadata.len(), "persisted file");
        Ok(record(persisted_name, path, &metadata))
    }

    async fn list(&self) -> StorageResult<Vec<StoredFileRecord>> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            // hidden covers the marker and in-flight temp files
            if name.starts_with('.') || self.is_reserved(&name) {
                continue;
            }

            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                // removed between read_dir and stat
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            };
            if !metadata.is_file() {
                continue;
            }

            records.push(record(name, entry.path(), &metadata));
        }

        Ok(records)
    }

    async fn delete(&self, persisted_name: &str) -> StorageResult<()> {
        let (path, _) = self.regular_file(persisted_name).await?;
        fs::remove_file(&path)
            .await
            .map_err(|err| not_found_or_io(err, persisted_name))?;
        tracing::info!(saved_name = %persisted_name, "deleted file");
        Ok(())
    }

    async fn open(&self, persisted_name: &str) -> StorageResult<(StoredFileRecord, Vec<u8>)> {
        let (path, metadata) = self.regular_file(persisted_name).await?;
        let data = fs::read(&path)
            .await
            .map_err(|err| not_found_or_io(err, persisted_name))?;
        Ok((record(persisted_name.to_string(), path, &metadata), data))
    }

    async fn exists(&self, persisted_name: &str) -> StorageResult<bool> {
        match self.regular_file(persisted_name).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn url(&self, persisted_name: &str) -> String {
        let prefix = self.public_url_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            persisted_name.to_string()
        } else {
            format!("{prefix}/{persisted_name}")
        }
    }
}
