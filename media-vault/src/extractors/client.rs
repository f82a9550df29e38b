//! Client address extractor

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;

/// Remote IP of the request, or `unknown` when the server was not started
/// with connection info
///
/// ```rust,no_run
/// use media_vault::extractors::ClientAddress;
///
/// async fn whoami(ClientAddress(addr): ClientAddress) -> String {
///     addr
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddress(pub String);

impl ClientAddress {
    /// Placeholder used when the peer address is not available
    pub const UNKNOWN: &'static str = "unknown";
}

impl fmt::Display for ClientAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for ClientAddress
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let address = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(
                || Self::UNKNOWN.to_string(),
                |ConnectInfo(addr)| addr.ip().to_string(),
            );
        Ok(Self(address))
    }
}
