//! Persisted file naming
//!
//! A persisted name is a numeric disambiguator (unix seconds at upload time),
//! an underscore, and the client's filename with every character outside
//! `[A-Za-z0-9._-]` replaced by `_`. The result is always a single path
//! component.
//!
//! When a name is already taken, storage retries with an attempt number
//! appended to the disambiguator (`1700000000` → `17000000001`). The prefix
//! stays all digits, so [`NameSanitizer::strip_disambiguator`] recovers the
//! sanitized name from any variant.
//!
//! ```rust
//! use media_vault::storage::NameSanitizer;
//!
//! let name = NameSanitizer::sanitize_at("My Photo!.png", 1_700_000_000);
//! assert_eq!(name.render(0), "1700000000_My_Photo_.png");
//! assert_eq!(name.render(3), "17000000003_My_Photo_.png");
//! assert_eq!(NameSanitizer::strip_disambiguator(&name.render(3)), "My_Photo_.png");
//! ```

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static DISAMBIGUATOR: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\d+_").unwrap()
});

/// A sanitized base name plus the disambiguator it was issued with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedName {
    secs: u64,
    base: String,
}

impl PersistedName {
    /// Sanitized client filename, without disambiguator
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Unix seconds used as the disambiguator
    #[must_use]
    pub const fn secs(&self) -> u64 {
        self.secs
    }

    /// File name for the given collision attempt
    ///
    /// Attempt `0` is the plain `<secs>_<base>` form.
    #[must_use]
    pub fn render(&self, attempt: u32) -> String {
        if attempt == 0 {
            format!("{}_{}", self.secs, self.base)
        } else {
            format!("{}{}_{}", self.secs, attempt, self.base)
        }
    }
}

impl fmt::Display for PersistedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(0))
    }
}

/// Derives safe persisted names from client-supplied filenames
#[derive(Debug, Clone, Copy, Default)]
pub struct NameSanitizer;

impl NameSanitizer {
    /// Sanitize `original` using the current wall-clock second
    #[must_use]
    pub fn sanitize(original: &str) -> PersistedName {
        let secs = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        Self::sanitize_at(original, secs)
    }

    /// Sanitize `original` with an explicit disambiguator
    #[must_use]
    pub fn sanitize_at(original: &str, secs: u64) -> PersistedName {
        PersistedName {
            secs,
            base: Self::sanitize_component(original),
        }
    }

    /// Replace every character outside `[A-Za-z0-9._-]` with `_`
    ///
    /// ```rust
    /// use media_vault::storage::NameSanitizer;
    ///
    /// assert_eq!(NameSanitizer::sanitize_component("../../etc/passwd"), ".._.._etc_passwd");
    /// assert_eq!(NameSanitizer::sanitize_component("résumé.pdf"), "r_sum_.pdf");
    /// ```
    #[must_use]
    pub fn sanitize_component(original: &str) -> String {
        original
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Remove a leading `<digits>_` disambiguator, if any
    ///
    /// Files that were not named by the sanitizer come back unchanged.
    ///
    /// ```rust
    /// use media_vault::storage::NameSanitizer;
    ///
    /// assert_eq!(NameSanitizer::strip_disambiguator("1700000000_cat.png"), "cat.png");
    /// assert_eq!(NameSanitizer::strip_disambiguator("cat.png"), "cat.png");
    /// ```
    #[must_use]
    pub fn strip_disambiguator(persisted_name: &str) -> &str {
        DISAMBIGUATOR
            .find(persisted_name)
            .map_or(persisted_name, |prefix| &persisted_name[prefix.end()..])
    }
}
