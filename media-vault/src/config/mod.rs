//! Configuration management for media-vault
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `VAULT_` prefix, `__` for nesting)
//! 2. `./config.toml` (development)
//! 3. `~/.config/media-vault/{service}/config.toml` (user config, XDG)
//! 4. `/etc/media-vault/{service}/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! Environment variable format: `VAULT_SECTION__FIELD_NAME`, for example
//! `VAULT_UPLOADS__MAX_FILE_SIZE=10485760`.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [storage]
//! root = "/var/lib/media-vault/uploads"
//! public_url_prefix = "uploads"
//!
//! [uploads]
//! max_file_size = 52428800
//! max_files_per_batch = 20
//! dangerous_extensions = ["php", "phtml", "php3", "php4", "php5", "phar"]
//!
//! [catalog]
//! display_name_length = 20
//! date_format = "%b %d, %Y %H:%M"
//!
//! [security]
//! headers_enabled = true
//! frame_options = "sameorigin"
//! ```
//!
//! Every component receives the section it needs at construction; nothing
//! reads configuration from process-wide state.

use crate::middleware::FrameOptions;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default per-file size limit (50 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: IpAddr,

    /// Port to bind
    pub port: u16,

    /// Upper bound on a single request, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            request_timeout_secs: 300,
        }
    }
}

impl ServerSettings {
    /// Socket address the server listens on
    #[must_use]
    pub const fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Storage root layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding persisted files, the marker and the audit log
    pub root: PathBuf,

    /// Prefix used when building public URLs for stored files
    pub public_url_prefix: String,

    /// Access-control marker written into the root
    pub marker_file: String,

    /// Contents of the access-control marker
    pub marker_contents: String,

    /// Audit log file name inside the root
    pub audit_log_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./uploads"),
            public_url_prefix: "uploads".to_string(),
            marker_file: ".htaccess".to_string(),
            marker_contents: "Deny from all".to_string(),
            audit_log_file: "upload_log.jsonl".to_string(),
        }
    }
}

impl StorageSettings {
    /// Full path of the audit log
    #[must_use]
    pub fn audit_log_path(&self) -> PathBuf {
        self.root.join(&self.audit_log_file)
    }
}

/// Upload acceptance policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    /// Largest accepted file, in bytes
    pub max_file_size: u64,

    /// Largest number of file parts processed per request
    pub max_files_per_batch: usize,

    /// MIME types accepted after content sniffing
    pub allowed_mime_types: Vec<String>,

    /// Extensions rejected before any sniffing
    pub dangerous_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_files_per_batch: 20,
            allowed_mime_types: [
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/webp",
                "image/svg+xml",
                "video/mp4",
                "video/quicktime",
                "video/x-msvideo",
                "video/webm",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            dangerous_extensions: ["php", "phtml", "php3", "php4", "php5", "phar"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl UploadSettings {
    /// Body limit for one upload request: every allowed file at full size
    /// plus headroom for multipart framing
    #[must_use]
    pub fn request_body_limit(&self) -> usize {
        const FRAMING_OVERHEAD: u64 = 1024 * 1024;
        let total = self
            .max_file_size
            .saturating_mul(self.max_files_per_batch as u64)
            .saturating_add(FRAMING_OVERHEAD);
        usize::try_from(total).unwrap_or(usize::MAX)
    }
}

/// Catalog presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Characters kept in the truncated display name
    pub display_name_length: usize,

    /// `chrono` format string for modification dates
    pub date_format: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            display_name_length: 20,
            date_format: "%b %d, %Y %H:%M".to_string(),
        }
    }
}

/// Response hardening
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    /// Add `nosniff`, frame and XSS headers to every response
    pub headers_enabled: bool,

    /// Value of `X-Frame-Options`
    pub frame_options: FrameOptions,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            headers_enabled: true,
            frame_options: FrameOptions::Deny,
        }
    }
}

/// Complete media-vault configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VaultConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerSettings,

    /// Storage root layout
    #[serde(default)]
    pub storage: StorageSettings,

    /// Upload policy
    #[serde(default)]
    pub uploads: UploadSettings,

    /// Catalog presentation
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Response hardening
    #[serde(default)]
    pub security: SecuritySettings,
}

impl VaultConfig {
    /// Load configuration for a specific service
    ///
    /// Searches for configuration with precedence:
    /// 1. Environment variables (`VAULT_*`, use `__` for nesting)
    /// 2. `./config.toml`
    /// 3. `~/.config/media-vault/{service_name}/config.toml`
    /// 4. `/etc/media-vault/{service_name}/config.toml`
    /// 5. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be parsed or a value
    /// has the wrong type.
    pub fn load_for_service(service_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?));

        let system_config = PathBuf::from("/etc/media-vault")
            .join(service_name)
            .join("config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path(service_name);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        figment = figment.merge(Env::prefixed("VAULT_").split("__").lowercase(true));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file yields the defaults (plus environment overrides).
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or values of the
    /// wrong type.
    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let config = Figment::new()
            .merge(Toml::string(&toml::to_string(&Self::default())?))
            .merge(Toml::file(path))
            .merge(Env::prefixed("VAULT_").split("__").lowercase(true))
            .extract()?;

        Ok(config)
    }

    /// Get the recommended XDG config path for a service
    ///
    /// ```rust
    /// use media_vault::config::VaultConfig;
    ///
    /// let path = VaultConfig::recommended_path("my-vault");
    /// // ~/.config/media-vault/my-vault/config.toml
    /// ```
    #[must_use]
    pub fn recommended_path(service_name: &str) -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./config.toml"),
            |config_dir| {
                config_dir
                    .join("media-vault")
                    .join(service_name)
                    .join("config.toml")
            },
        )
    }
}
