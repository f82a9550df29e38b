//! Presentation helpers shared by upload responses and the catalog
//!
//! ```rust
//! use media_vault::format::{format_size, truncate_display};
//!
//! assert_eq!(format_size(1536), "1.5 KB");
//! assert_eq!(truncate_display("holiday-in-the-mountains.jpg", 8), "holiday-...");
//! ```

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Render a byte count in the largest unit whose magnitude is at least one
///
/// The quotient is rounded to two decimals and trailing zeros are dropped.
/// Values beyond the GB range stay in GB.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    let mut unit = 0;
    let mut threshold: u64 = 1024;
    while unit < SIZE_UNITS.len() - 1 && bytes >= threshold {
        unit += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let divisor = 1024_f64.powi(i32::try_from(unit).unwrap_or(0));
    let value = (bytes as f64 / divisor * 100.0).round() / 100.0;
    format!("{} {}", trim_decimal(value), SIZE_UNITS[unit])
}

fn trim_decimal(value: f64) -> String {
    let rendered = format!("{value:.2}");
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Shorten a name to `max_chars` characters followed by `...`
///
/// Names that already fit are returned unchanged.
#[must_use]
pub fn truncate_display(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }
    let mut short: String = name.chars().take(max_chars).collect();
    short.push_str("...");
    short
}

/// Render a timestamp in the server's local time zone
///
/// A pattern `chrono` cannot render falls back to RFC 3339.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>, pattern: &str) -> String {
    let local = at.with_timezone(&Local);
    let mut rendered = String::new();
    if write!(rendered, "{}", local.format(pattern)).is_err() {
        return local.to_rfc3339();
    }
    rendered
}

/// Whether every specifier in `pattern` is one `chrono` understands
#[must_use]
pub fn is_valid_date_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}
