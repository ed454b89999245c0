//! Transport seam for the proxy.
//!
//! The proxy only needs two verbs: a buffered GET for the conversation
//! lookup and a POST whose body arrives incrementally. Tests swap in
//! [`crate::adapters::MockHttpClient`] to script the byte stream exactly.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use thiserror::Error;

/// Request headers, sent verbatim.
pub type Headers = HashMap<String, String>;

/// Response body delivered chunk by chunk, in arrival order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// A fully buffered reply to a GET.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx statuses only.
    pub fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Failures surfaced by a transport before or while reading a body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Non-2xx reply to a streaming POST. `message` is the whole body.
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The body stream broke after it started.
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error: {0}")]
    Other(String),
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// GET `url` and buffer the whole reply.
    ///
    /// Non-success statuses come back as a [`Response`], not an error.
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError>;

    /// POST `body` to `url` and hand back the reply body as it arrives.
    ///
    /// A non-success status is reported as [`HttpError::ServerError`] with
    /// the full body read; no stream is returned in that case.
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError>;
}
