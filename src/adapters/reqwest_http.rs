//! Production transport backed by reqwest.

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// [`HttpClient`] over a shared `reqwest::Client`.
///
/// The client carries no overall request timeout. Deadlines belong to the
/// proxy, which applies them per call, so a long reply stream is never cut
/// off by the transport. Clones share one connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured client (proxy settings, TLS roots, connect timeout).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        headers: &Headers,
    ) -> reqwest::RequestBuilder {
        headers
            .iter()
            .fold(self.client.request(method, url), |req, (name, value)| {
                req.header(name.as_str(), value.as_str())
            })
    }
}

fn transport_error(err: reqwest::Error) -> HttpError {
    let detail = err.to_string();
    if err.is_timeout() {
        HttpError::Timeout(detail)
    } else if err.is_connect() {
        HttpError::ConnectionFailed(detail)
    } else if err.is_builder() {
        HttpError::InvalidUrl(detail)
    } else {
        HttpError::Other(detail)
    }
}

fn body_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout(err.to_string())
    } else {
        HttpError::Io(err.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let reply = self
            .request(reqwest::Method::GET, url, headers)
            .send()
            .await
            .map_err(transport_error)?;

        let status = reply.status().as_u16();
        let body = reply.bytes().await.map_err(body_error)?;
        Ok(Response::new(status, body))
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let reply = self
            .request(reqwest::Method::POST, url, headers)
            .body(body.to_owned())
            .send()
            .await
            .map_err(transport_error)?;

        let status = reply.status();
        if !status.is_success() {
            // An unreadable error body still reports the status.
            let message = reply.text().await.unwrap_or_default();
            return Err(HttpError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Box::pin(
            reply.bytes_stream().map(|chunk| chunk.map_err(body_error)),
        ))
    }
}
