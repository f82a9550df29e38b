//! Content classification and magic number checking
//!
//! Two separate questions are answered here:
//!
//! - *What kind of media does this look like?* [`classify_by_extension`] only
//!   looks at the name. It drives catalog presentation and is advisory.
//! - *Is this content really an allowed media type?* [`MimeValidator`]
//!   sniffs the bytes and never consults the client's Content-Type header.
//!
//! SVG has no binary signature, so it is recognised by its markup: an
//! optional XML prolog, comments or doctype, then an `<svg` root element.
//!
//! ```rust
//! use media_vault::storage::{MimeValidator, MimeVerdict};
//!
//! let validator = MimeValidator::new(["image/png"]);
//!
//! let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
//! assert_eq!(validator.verify_authenticity(&png, "png"), MimeVerdict::Allowed("image/png"));
//!
//! // a Windows executable renamed to .png
//! let exe = b"MZ\x90\x00\x03\x00\x00\x00";
//! assert!(!validator.verify_authenticity(exe, "png").is_allowed());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::types::extension_of;

const SVG_MIME: &str = "image/svg+xml";

/// How far into a file the SVG root element is searched for
const SVG_SCAN_LIMIT: usize = 4096;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];
const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "webm", "mkv"];

/// Coarse media classification used by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// Still image
    Image,
    /// Video
    Video,
    /// Anything else
    Other,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Other => "other",
        })
    }
}

/// Classify a file by the lower-cased extension of its name
///
/// ```rust
/// use media_vault::storage::{classify_by_extension, MediaType};
///
/// assert_eq!(classify_by_extension("Beach.JPG"), MediaType::Image);
/// assert_eq!(classify_by_extension("clip.mkv"), MediaType::Video);
/// assert_eq!(classify_by_extension("notes.txt"), MediaType::Other);
/// ```
#[must_use]
pub fn classify_by_extension(name: &str) -> MediaType {
    let ext = extension_of(name);
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        MediaType::Image
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        MediaType::Video
    } else {
        MediaType::Other
    }
}

/// Outcome of sniffing a file's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeVerdict {
    /// Sniffed type is on the allow-list
    Allowed(&'static str),
    /// Sniffed type is not allowed, or nothing could be identified (`None`)
    Rejected(Option<&'static str>),
}

impl MimeVerdict {
    /// Whether the content may be stored
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// MIME type validator using magic number detection
#[derive(Debug, Clone)]
pub struct MimeValidator {
    allowed: Vec<String>,
}

impl MimeValidator {
    /// Creates a validator accepting the given MIME types
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// MIME types this validator accepts
    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Detects the actual MIME type from file content
    ///
    /// Returns `None` if the content cannot be identified.
    ///
    /// ```rust
    /// use media_vault::storage::MimeValidator;
    ///
    /// assert_eq!(MimeValidator::detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
    /// assert_eq!(MimeValidator::detect_mime(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"), Some("image/svg+xml"));
    /// assert_eq!(MimeValidator::detect_mime(b"plain words"), None);
    /// ```
    #[must_use]
    pub fn detect_mime(content: &[u8]) -> Option<&'static str> {
        if looks_like_svg(content) {
            return Some(SVG_MIME);
        }
        infer::get(content).map(|kind| kind.mime_type())
    }

    /// Checks the sniffed type of `content` against the allow-list
    ///
    /// `declared_extension` is only used for diagnostics; acceptance depends
    /// on the bytes alone.
    #[must_use]
    pub fn verify_authenticity(&self, content: &[u8], declared_extension: &str) -> MimeVerdict {
        let sniffed = Self::detect_mime(content);
        let verdict = match sniffed {
            Some(mime) if self.allowed.iter().any(|allowed| allowed == mime) => {
                MimeVerdict::Allowed(mime)
            }
            other => MimeVerdict::Rejected(other),
        };

        if !verdict.is_allowed() {
            tracing::debug!(
                extension = declared_extension,
                sniffed = sniffed.unwrap_or("unknown"),
                "content type not allowed"
            );
        }
        verdict
    }
}

/// Markup check for SVG documents
///
/// Skips a byte order mark, whitespace, an XML declaration, processing
/// instructions, comments and a doctype, then requires `<svg` as the first
/// element.
fn looks_like_svg(content: &[u8]) -> bool {
    let head = &content[..content.len().min(SVG_SCAN_LIMIT)];
    let Ok(text) = std::str::from_utf8(head).or_else(|err| {
        // the scan window may split a multi-byte character
        std::str::from_utf8(&head[..err.valid_up_to()])
    }) else {
        return false;
    };

    let mut rest = text.strip_prefix('\u{feff}').unwrap_or(text);
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("<?") {
            let Some(end) = after.find("?>") else {
                return false;
            };
            rest = &after[end + 2..];
        } else if let Some(after) = rest.strip_prefix("<!--") {
            let Some(end) = after.find("-->") else {
                return false;
            };
            rest = &after[end + 3..];
        } else if rest
            .as_bytes()
            .get(..9)
            .is_some_and(|head| head.eq_ignore_ascii_case(b"<!doctype"))
        {
            let Some(end) = rest.find('>') else {
                return false;
            };
            rest = &rest[end + 1..];
        } else {
            break;
        }
    }

    let Some(tag) = rest.strip_prefix("<svg") else {
        return false;
    };
    tag.chars()
        .next()
        .is_some_and(|c| c.is_ascii_whitespace() || c == '>' || c == '/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UploadSettings;
    use crate::testing::fixtures;

    fn default_validator() -> MimeValidator {
        MimeValidator::new(UploadSettings::default().allowed_mime_types)
    }

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify_by_extension("a.png"), MediaType::Image);
        assert_eq!(classify_by_extension("a.SVG"), MediaType::Image);
        assert_eq!(classify_by_extension("a.MOV"), MediaType::Video);
        assert_eq!(classify_by_extension("a.avi"), MediaType::Video);
        assert_eq!(classify_by_extension("a.pdf"), MediaType::Other);
        assert_eq!(classify_by_extension("noext"), MediaType::Other);
        // only the final extension counts
        assert_eq!(classify_by_extension("a.png.txt"), MediaType::Other);
    }

    #[test]
    fn test_detects_common_media() {
        assert_eq!(MimeValidator::detect_mime(fixtures::PNG), Some("image/png"));
        assert_eq!(MimeValidator::detect_mime(fixtures::JPEG), Some("image/jpeg"));
        assert_eq!(MimeValidator::detect_mime(fixtures::GIF), Some("image/gif"));
        assert_eq!(MimeValidator::detect_mime(fixtures::MP4), Some("video/mp4"));
    }

    #[test]
    fn test_png_allowed() {
        let verdict = default_validator().verify_authenticity(fixtures::PNG, "png");
        assert_eq!(verdict, MimeVerdict::Allowed("image/png"));
    }

    #[test]
    fn test_renamed_executable_rejected() {
        let verdict = default_validator().verify_authenticity(fixtures::EXE, "jpg");
        assert!(!verdict.is_allowed());
        assert!(matches!(verdict, MimeVerdict::Rejected(Some(_))));
    }

    #[test]
    fn test_unknown_content_rejected() {
        let verdict = default_validator().verify_authenticity(b"just some text", "png");
        assert_eq!(verdict, MimeVerdict::Rejected(None));
    }

    #[test]
    fn test_empty_content_rejected() {
        let verdict = default_validator().verify_authenticity(&[], "png");
        assert_eq!(verdict, MimeVerdict::Rejected(None));
    }

    #[test]
    fn test_svg_variants() {
        let plain = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;
        assert!(looks_like_svg(plain));

        let with_prolog = b"\xEF\xBB\xBF<?xml version=\"1.0\"?>\n<!-- drawn by hand -->\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"x\">\n<svg>\n</svg>";
        assert!(looks_like_svg(with_prolog));

        assert_eq!(
            default_validator().verify_authenticity(fixtures::SVG, "svg"),
            MimeVerdict::Allowed("image/svg+xml")
        );
    }

    #[test]
    fn test_markup_that_is_not_svg() {
        assert!(!looks_like_svg(b"<html><svg></svg></html>"));
        assert!(!looks_like_svg(b"<svgfoo>"));
        assert!(!looks_like_svg(b"<?xml version=\"1.0\"?><note/>"));
        assert!(!looks_like_svg(b"<!-- never closed <svg>"));
    }

    #[test]
    fn test_allow_list_is_respected() {
        let only_png = MimeValidator::new(["image/png"]);
        assert!(!only_png.verify_authenticity(fixtures::JPEG, "jpg").is_allowed());
        assert!(only_png.verify_authenticity(fixtures::PNG, "png").is_allowed());
    }
}
