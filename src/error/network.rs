//! Transport-level error types.
//!
//! Everything below the HTTP status line ends up here: refused
//! connections, TLS failures, and bodies that break off mid-stream.

use thiserror::Error;

use crate::traits::HttpError;

use super::ProxyError;

/// Transport failures between the client and the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Could not connect (DNS, refused connection, TLS handshake).
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The HTTP layer gave up on its own timer.
    #[error("transport timed out: {0}")]
    TransportTimeout(String),

    /// The response body broke off while it was being read.
    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),

    /// The endpoint URL could not be used.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

impl NetworkError {
    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => "E_NET_CONN",
            NetworkError::TransportTimeout(_) => "E_NET_TIMEOUT",
            NetworkError::StreamInterrupted(_) => "E_NET_STREAM",
            NetworkError::InvalidUrl(_) => "E_NET_URL",
            NetworkError::Other(_) => "E_NET_OTHER",
        }
    }
}

/// Classify an [`HttpError`] from the transport layer.
///
/// A non-success status becomes [`ProxyError::Backend`]; everything else is a
/// [`NetworkError`].
impl From<HttpError> for ProxyError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::ServerError { status, message } => ProxyError::Backend {
                status,
                body: message,
            },
            HttpError::ConnectionFailed(msg) => NetworkError::ConnectionFailed(msg).into(),
            HttpError::Timeout(msg) => NetworkError::TransportTimeout(msg).into(),
            HttpError::Io(msg) => NetworkError::StreamInterrupted(msg).into(),
            HttpError::InvalidUrl(msg) => NetworkError::InvalidUrl(msg).into(),
            HttpError::Other(msg) => NetworkError::Other(msg).into(),
        }
    }
}
