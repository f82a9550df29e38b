//! Upload acceptance policy
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. size against the configured maximum
//! 2. extension against the executable denylist, before any content is read
//! 3. sniffed content type against the allow-list
//!
//! ```rust
//! use media_vault::error::ErrorKind;
//! use media_vault::storage::{UploadCandidate, UploadValidator, ValidationVerdict};
//!
//! let validator = UploadValidator::builder()
//!     .max_file_size(1024)
//!     .allowed_mime_types(["image/png"])
//!     .build();
//!
//! let shell = UploadCandidate::new("shell.php", "image/png", b"<?php echo 1;".to_vec());
//! match validator.validate(&shell) {
//!     ValidationVerdict::Rejected { reason, .. } => {
//!         assert_eq!(reason, ErrorKind::DangerousExtension);
//!     }
//!     ValidationVerdict::Accepted { .. } => unreachable!(),
//! }
//! ```

use crate::config::{UploadSettings, DEFAULT_MAX_FILE_SIZE};
use crate::error::ErrorKind;
use crate::format::format_size;

use super::types::UploadCandidate;
use super::validation::{MimeValidator, MimeVerdict};

/// Result of checking one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    /// The candidate may be stored
    Accepted {
        /// Content type determined from the bytes
        sniffed_mime: &'static str,
    },
    /// The candidate must not be stored
    Rejected {
        /// Machine readable reason
        reason: ErrorKind,
        /// Message reported to the client
        detail: String,
    },
}

impl ValidationVerdict {
    fn rejected(reason: ErrorKind, detail: String) -> Self {
        Self::Rejected { reason, detail }
    }

    /// Whether the candidate may be stored
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Per-file upload policy
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: u64,
    dangerous_extensions: Vec<String>,
    mime: MimeValidator,
}

impl UploadValidator {
    /// Creates a new validator builder
    #[must_use]
    pub fn builder() -> UploadValidatorBuilder {
        UploadValidatorBuilder::new()
    }

    /// Builds a validator from the `[uploads]` configuration section
    #[must_use]
    pub fn from_settings(settings: &UploadSettings) -> Self {
        Self::builder()
            .max_file_size(settings.max_file_size)
            .allowed_mime_types(settings.allowed_mime_types.iter().cloned())
            .dangerous_extensions(settings.dangerous_extensions.iter().cloned())
            .build()
    }

    /// Largest accepted file, in bytes
    #[must_use]
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Check one candidate
    #[must_use]
    pub fn validate(&self, candidate: &UploadCandidate) -> ValidationVerdict {
        let name = &candidate.declared_name;

        if candidate.size > self.max_file_size {
            return ValidationVerdict::rejected(
                ErrorKind::TooLarge,
                format!(
                    "{} (max {})",
                    ErrorKind::TooLarge.for_file(name),
                    format_size(self.max_file_size)
                ),
            );
        }

        let extension = candidate.extension();
        if self.dangerous_extensions.iter().any(|d| *d == extension) {
            return ValidationVerdict::rejected(
                ErrorKind::DangerousExtension,
                ErrorKind::DangerousExtension.for_file(name),
            );
        }

        match self.mime.verify_authenticity(&candidate.data, &extension) {
            MimeVerdict::Allowed(sniffed_mime) => ValidationVerdict::Accepted { sniffed_mime },
            MimeVerdict::Rejected(_) => ValidationVerdict::rejected(
                ErrorKind::TypeMismatch,
                ErrorKind::TypeMismatch.for_file(name),
            ),
        }
    }
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::from_settings(&UploadSettings::default())
    }
}

/// Builder for [`UploadValidator`]
#[derive(Debug, Clone)]
pub struct UploadValidatorBuilder {
    max_file_size: u64,
    allowed_mime_types: Vec<String>,
    dangerous_extensions: Vec<String>,
}

impl Default for UploadValidatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadValidatorBuilder {
    /// Starts from the default size limit with empty lists
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_mime_types: Vec::new(),
            dangerous_extensions: Vec::new(),
        }
    }

    /// Sets the maximum file size in bytes
    #[must_use]
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Sets the MIME types accepted after sniffing
    #[must_use]
    pub fn allowed_mime_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mime_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the extensions rejected without sniffing (compared lower-cased)
    #[must_use]
    pub fn dangerous_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dangerous_extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Builds the validator
    #[must_use]
    pub fn build(self) -> UploadValidator {
        UploadValidator {
            max_file_size: self.max_file_size,
            dangerous_extensions: self.dangerous_extensions,
            mime: MimeValidator::new(self.allowed_mime_types),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn reason(verdict: &ValidationVerdict) -> Option<ErrorKind> {
        match verdict {
            ValidationVerdict::Rejected { reason, .. } => Some(*reason),
            ValidationVerdict::Accepted { .. } => None,
        }
    }

    #[test]
    fn test_accepts_png() {
        let validator = UploadValidator::default();
        let file = UploadCandidate::new("cat.png", "image/png", fixtures::PNG.to_vec());
        assert_eq!(
            validator.validate(&file),
            ValidationVerdict::Accepted {
                sniffed_mime: "image/png"
            }
        );
    }

    #[test]
    fn test_too_large_checked_first() {
        let validator = UploadValidator::builder()
            .max_file_size(10)
            .allowed_mime_types(["image/png"])
            .dangerous_extensions(["php"])
            .build();
        // oversized, dangerous and unsniffable all at once
        let file = UploadCandidate::oversized("big.php", "image/png", 11);
        let verdict = validator.validate(&file);
        assert_eq!(reason(&verdict), Some(ErrorKind::TooLarge));
        let ValidationVerdict::Rejected { detail, .. } = verdict else {
            panic!("expected rejection");
        };
        assert_eq!(detail, "File too large: big.php (max 10 B)");
    }

    #[test]
    fn test_exactly_max_size_is_allowed() {
        let validator = UploadValidator::builder()
            .max_file_size(fixtures::PNG.len() as u64)
            .allowed_mime_types(["image/png"])
            .build();
        let file = UploadCandidate::new("cat.png", "image/png", fixtures::PNG.to_vec());
        assert!(validator.validate(&file).is_accepted());
    }

    #[test]
    fn test_default_limit_message() {
        let validator = UploadValidator::default();
        let file = UploadCandidate::oversized("movie.mp4", "video/mp4", DEFAULT_MAX_FILE_SIZE + 1);
        let ValidationVerdict::Rejected { detail, .. } = validator.validate(&file) else {
            panic!("expected rejection");
        };
        assert_eq!(detail, "File too large: movie.mp4 (max 50 MB)");
    }

    #[test]
    fn test_dangerous_extension_before_sniffing() {
        let validator = UploadValidator::default();
        // valid PNG bytes do not rescue a .php name
        let file = UploadCandidate::new("avatar.PHP", "image/png", fixtures::PNG.to_vec());
        let verdict = validator.validate(&file);
        assert_eq!(reason(&verdict), Some(ErrorKind::DangerousExtension));
        assert_eq!(
            verdict,
            ValidationVerdict::Rejected {
                reason: ErrorKind::DangerousExtension,
                detail: "Dangerous file type: avatar.PHP".to_string(),
            }
        );
    }

    #[test]
    fn test_all_default_dangerous_extensions() {
        let validator = UploadValidator::default();
        for ext in ["php", "phtml", "php3", "php4", "php5", "phar"] {
            let file = UploadCandidate::new(format!("x.{ext}"), "image/png", fixtures::PNG.to_vec());
            assert_eq!(
                reason(&validator.validate(&file)),
                Some(ErrorKind::DangerousExtension),
                "{ext}"
            );
        }
    }

    #[test]
    fn test_only_final_extension_is_checked() {
        let validator = UploadValidator::default();
        let file = UploadCandidate::new("shell.php.png", "image/png", fixtures::PNG.to_vec());
        assert!(validator.validate(&file).is_accepted());
    }

    #[test]
    fn test_renamed_executable_is_type_mismatch() {
        let validator = UploadValidator::default();
        let file = UploadCandidate::new("holiday.jpg", "image/jpeg", fixtures::EXE.to_vec());
        let verdict = validator.validate(&file);
        assert_eq!(reason(&verdict), Some(ErrorKind::TypeMismatch));
        assert_eq!(
            verdict,
            ValidationVerdict::Rejected {
                reason: ErrorKind::TypeMismatch,
                detail: "Invalid file type: holiday.jpg".to_string(),
            }
        );
    }

    #[test]
    fn test_declared_mime_is_ignored() {
        let validator = UploadValidator::default();
        let file = UploadCandidate::new("cat.png", "application/x-msdownload", fixtures::PNG.to_vec());
        assert!(validator.validate(&file).is_accepted());
    }

    #[test]
    fn test_builder_normalises_extensions() {
        let validator = UploadValidator::builder()
            .allowed_mime_types(["image/png"])
            .dangerous_extensions([".CGI"])
            .build();
        let file = UploadCandidate::new("run.cgi", "image/png", fixtures::PNG.to_vec());
        assert_eq!(reason(&validator.validate(&file)), Some(ErrorKind::DangerousExtension));
    }
}
