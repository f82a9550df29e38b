//! Catalog of stored files, derived from the storage root on every read
//!
//! There is no index: each [`Catalog::build`] lists the root, strips the
//! numeric disambiguator from every persisted name, classifies the file by
//! extension and sorts newest first. Equal modification times are ordered by
//! persisted name so repeated reads return the same sequence.

use crate::config::CatalogSettings;
use crate::format::{format_size, format_timestamp, is_valid_date_format, truncate_display};
use crate::storage::{
    classify_by_extension, extension_of, FileStorage, MediaType, NameSanitizer, StorageResult,
    StoredFileRecord,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One file as presented to catalog consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Name inside the storage root
    pub persisted_name: String,
    /// Persisted name without its disambiguator
    pub original_name: String,
    /// `original_name`, shortened for display
    pub display_name: String,
    /// Classification from the extension
    pub media_type: MediaType,
    /// Size in human units
    pub formatted_size: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time in local time
    pub formatted_date: String,
    /// Modification time
    pub modified_at: DateTime<Utc>,
    /// Lower-cased extension
    pub extension: String,
    /// Public URL
    pub url: String,
}

/// Builds catalog views over a [`FileStorage`]
#[derive(Clone)]
pub struct Catalog {
    storage: Arc<dyn FileStorage>,
    settings: CatalogSettings,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Catalog {
    /// Creates a catalog over `storage`
    ///
    /// An unusable `date_format` is reported once here; dates are then
    /// rendered as RFC 3339.
    pub fn new(storage: Arc<dyn FileStorage>, settings: CatalogSettings) -> Self {
        if !is_valid_date_format(&settings.date_format) {
            tracing::warn!(
                date_format = %settings.date_format,
                "unsupported catalog date format, falling back to RFC 3339"
            );
        }
        Self { storage, settings }
    }

    /// Every stored file, newest first
    ///
    /// An empty root yields an empty vector.
    pub async fn build(&self) -> StorageResult<Vec<CatalogEntry>> {
        let mut records = self.storage.list().await?;
        records.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| a.persisted_name.cmp(&b.persisted_name))
        });

        let entries: Vec<_> = records.into_iter().map(|record| self.entry(record)).collect();
        tracing::debug!(files = entries.len(), "built catalog");
        Ok(entries)
    }

    /// Presentation of a single record
    #[must_use]
    pub fn entry(&self, record: StoredFileRecord) -> CatalogEntry {
        let original_name = NameSanitizer::strip_disambiguator(&record.persisted_name).to_string();
        let url = self.storage.url(&record.persisted_name);

        CatalogEntry {
            display_name: truncate_display(&original_name, self.settings.display_name_length),
            media_type: classify_by_extension(&original_name),
            extension: extension_of(&original_name),
            formatted_size: format_size(record.size),
            size: record.size,
            formatted_date: format_timestamp(record.modified_at, &self.settings.date_format),
            modified_at: record.modified_at,
            original_name,
            persisted_name: record.persisted_name,
            url,
        }
    }
}
