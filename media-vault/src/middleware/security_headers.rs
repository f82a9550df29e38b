//! Security headers middleware
//!
//! Adds to every response:
//! - `X-Content-Type-Options: nosniff` so browsers never reinterpret a stored
//!   file as script or markup
//! - `X-Frame-Options` against clickjacking
//! - `X-XSS-Protection` for legacy browsers
//!
//! # Example
//!
//! ```rust,no_run
//! # use media_vault::middleware::{SecurityHeadersConfig, SecurityHeadersLayer};
//! # use axum::Router;
//! let app: Router<()> = Router::new()
//!     .layer(SecurityHeadersLayer::new(SecurityHeadersConfig::strict()));
//! ```

use crate::config::SecuritySettings;
use axum::{
    body::Body,
    http::{header, HeaderValue, Request, Response},
};
use serde::{Deserialize, Serialize};

/// Configuration for security headers middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityHeadersConfig {
    /// X-Frame-Options header, `None` disables it
    pub frame_options: Option<FrameOptions>,

    /// X-Content-Type-Options: nosniff
    pub content_type_options: bool,

    /// X-XSS-Protection header
    /// - `Some(true)`: `1; mode=block`
    /// - `Some(false)`: `1`
    /// - `None`: disabled
    pub xss_protection: Option<bool>,
}

/// Frame options for X-Frame-Options header
///
/// Configured as `frame_options = "deny"` or `"sameorigin"` in `[security]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameOptions {
    /// Prevent all framing (DENY)
    #[default]
    Deny,
    /// Allow framing from same origin (SAMEORIGIN)
    SameOrigin,
}

impl FrameOptions {
    const fn header_value(self) -> HeaderValue {
        match self {
            Self::Deny => HeaderValue::from_static("DENY"),
            Self::SameOrigin => HeaderValue::from_static("SAMEORIGIN"),
        }
    }
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl SecurityHeadersConfig {
    /// `nosniff`, `DENY` and `1; mode=block`
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            frame_options: Some(FrameOptions::Deny),
            content_type_options: true,
            xss_protection: Some(true),
        }
    }

    /// Strict headers with the configured frame option
    #[must_use]
    pub const fn from_settings(settings: &SecuritySettings) -> Self {
        Self::strict().with_frame_options(settings.frame_options)
    }

    /// Set the X-Frame-Options header
    #[must_use]
    pub const fn with_frame_options(mut self, options: FrameOptions) -> Self {
        self.frame_options = Some(options);
        self
    }
}

/// Security headers middleware layer
#[derive(Debug, Clone)]
pub struct SecurityHeadersLayer {
    config: SecurityHeadersConfig,
}

impl SecurityHeadersLayer {
    /// Create a new security headers layer with the given configuration
    #[must_use]
    pub const fn new(config: SecurityHeadersConfig) -> Self {
        Self { config }
    }
}

impl<S> tower::Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersMiddleware {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Security headers middleware service
#[derive(Debug, Clone)]
pub struct SecurityHeadersMiddleware<S> {
    inner: S,
    config: SecurityHeadersConfig,
}

impl<S> tower::Service<Request<Body>> for SecurityHeadersMiddleware<S>
where
    S: tower::Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let config = self.config.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            let mut response = future.await?;
            add_security_headers(&mut response, &config);
            Ok(response)
        })
    }
}

/// Add security headers to a response
fn add_security_headers(response: &mut Response<Body>, config: &SecurityHeadersConfig) {
    let headers = response.headers_mut();

    if let Some(frame_options) = config.frame_options {
        headers.insert(header::X_FRAME_OPTIONS, frame_options.header_value());
    }

    if config.content_type_options {
        headers.insert(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        );
    }

    if let Some(block_mode) = config.xss_protection {
        let value = if block_mode { "1; mode=block" } else { "1" };
        headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static(value));
    }
}
