//! Scripted transport for tests.
//!
//! Replies are keyed by exact URL with an optional fallback. Every call is
//! logged so a test can check what went over the wire, or that nothing did.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response};

/// One call as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// "GET" or "POST"
    pub method: String,
    pub url: String,
    pub headers: Headers,
    /// POST payload; `None` for GET
    pub body: Option<String>,
}

/// What the mock does when a URL is hit.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Buffered reply. A non-2xx status on a POST becomes `ServerError`.
    Success(Response),
    /// Fail before any body is produced
    Error(HttpError),
    /// Deliver these chunks, then end the body
    Stream(Vec<Bytes>),
    /// Deliver these chunks, then never produce another
    StreamThenHang(Vec<Bytes>),
    /// Deliver these chunks, then fail the body read
    StreamThenFail(Vec<Bytes>, HttpError),
}

#[derive(Debug, Default)]
struct MockState {
    routes: HashMap<String, MockResponse>,
    fallback: Option<MockResponse>,
    log: Vec<RecordedRequest>,
}

/// In-memory [`HttpClient`]. Clones share routes and the request log.
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.set_response(
///     "https://proxy.test/api/conversation",
///     MockResponse::Stream(vec![Bytes::from("data: [DONE]\n\n")]),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    state: Arc<Mutex<MockState>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Script the reply for one exact URL.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.state().routes.insert(url.to_string(), response);
    }

    /// Script the reply for any URL without its own route.
    pub fn set_default_response(&self, response: MockResponse) {
        self.state().fallback = Some(response);
    }

    /// Requests seen so far, oldest first.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.state().log.clone()
    }

    pub fn clear_requests(&self) {
        self.state().log.clear();
    }

    /// Log the call and look up its scripted reply.
    fn handle(
        &self,
        method: &str,
        url: &str,
        headers: &Headers,
        body: Option<&str>,
    ) -> Option<MockResponse> {
        let mut state = self.state();
        state.log.push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body: body.map(str::to_string),
        });
        state.routes.get(url).or(state.fallback.as_ref()).cloned()
    }
}

fn unscripted(url: &str) -> HttpError {
    HttpError::Other(format!("No mock response for URL: {}", url))
}

fn replay(chunks: Vec<Bytes>) -> stream::Iter<std::vec::IntoIter<Result<Bytes, HttpError>>> {
    stream::iter(chunks.into_iter().map(Ok).collect::<Vec<_>>())
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        match self.handle("GET", url, headers, None) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(_) => Err(HttpError::Other(format!("Stream scripted for GET {}", url))),
            None => Err(unscripted(url)),
        }
    }

    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<ByteStream, HttpError> {
        let stream: ByteStream = match self.handle("POST", url, headers, Some(body)) {
            Some(MockResponse::Stream(chunks)) => Box::pin(replay(chunks)),
            Some(MockResponse::StreamThenHang(chunks)) => {
                Box::pin(replay(chunks).chain(stream::pending()))
            }
            Some(MockResponse::StreamThenFail(chunks, err)) => {
                Box::pin(replay(chunks).chain(stream::once(async move { Err(err) })))
            }
            Some(MockResponse::Success(response)) if !response.is_success() => {
                return Err(HttpError::ServerError {
                    status: response.status,
                    message: response.text_lossy(),
                });
            }
            Some(MockResponse::Success(_)) => {
                return Err(HttpError::Other(format!(
                    "Buffered reply scripted for POST {}",
                    url
                )));
            }
            Some(MockResponse::Error(err)) => return Err(err),
            None => return Err(unscripted(url)),
        };
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(mut stream: ByteStream) -> Vec<Result<Bytes, HttpError>> {
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item);
        }
        items
    }

    #[tokio::test]
    async fn test_route_takes_precedence_over_fallback() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(404, "fallback")));
        client.set_response(
            "https://proxy.test/api/conversation/c1",
            MockResponse::Success(Response::new(200, "routed")),
        );

        let routed = client
            .get("https://proxy.test/api/conversation/c1", &Headers::new())
            .await
            .unwrap();
        let other = client
            .get("https://proxy.test/api/conversation/c2", &Headers::new())
            .await
            .unwrap();

        assert_eq!(routed.text_lossy(), "routed");
        assert_eq!(other.status, 404);
    }

    #[tokio::test]
    async fn test_post_stream_replays_chunks_and_logs_body() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Stream(vec![
            Bytes::from("data: a"),
            Bytes::from("\n\n"),
        ]));

        let stream = client
            .post_stream("https://proxy.test/api/conversation", "{}", &Headers::new())
            .await
            .unwrap();
        let chunks: Vec<Bytes> = drain(stream).await.into_iter().map(|c| c.unwrap()).collect();

        assert_eq!(chunks, vec![Bytes::from("data: a"), Bytes::from("\n\n")]);
        let log = client.get_requests();
        assert_eq!(log[0].method, "POST");
        assert_eq!(log[0].body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_stream_then_fail_ends_with_error() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::StreamThenFail(
            vec![Bytes::from("data: a\n\n")],
            HttpError::Io("reset".to_string()),
        ));

        let stream = client
            .post_stream("https://proxy.test/api/conversation", "{}", &Headers::new())
            .await
            .unwrap();
        let items = drain(stream).await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert_eq!(items[1], Err(HttpError::Io("reset".to_string())));
    }

    #[tokio::test]
    async fn test_error_status_on_post_becomes_server_error() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(503, "busy")));

        let result = client
            .post_stream("https://proxy.test/api/conversation", "{}", &Headers::new())
            .await;

        assert!(matches!(
            result,
            Err(HttpError::ServerError { status: 503, ref message }) if message == "busy"
        ));
    }

    #[tokio::test]
    async fn test_unscripted_url_fails_but_is_logged() {
        let client = MockHttpClient::new();
        let result = client.get("https://proxy.test/missing", &Headers::new()).await;

        assert!(matches!(result, Err(HttpError::Other(_))));
        assert_eq!(client.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_the_request_log() {
        let client = MockHttpClient::new();
        client.set_default_response(MockResponse::Success(Response::new(200, Bytes::new())));

        let cloned = client.clone();
        cloned.get("https://proxy.test/", &Headers::new()).await.unwrap();

        assert_eq!(client.get_requests().len(), 1);
        client.clear_requests();
        assert!(cloned.get_requests().is_empty());
    }
}
