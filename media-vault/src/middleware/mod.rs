//! Middleware for media-vault
//!
//! - [`SecurityHeadersLayer`] - anti-sniffing and anti-framing headers on
//!   every response

pub mod security_headers;

pub use security_headers::{FrameOptions, SecurityHeadersConfig, SecurityHeadersLayer};
