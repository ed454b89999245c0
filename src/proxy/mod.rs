//! Request lifecycle: one streamed exchange with the conversation backend.
//!
//! A call validates its request, POSTs it, and feeds the response body
//! through the frame parser, the interpreter and the accumulator until the
//! reply completes. The exchange races a deadline and a cancellation token;
//! whichever settles first decides the outcome and the losing futures are
//! dropped, which closes the connection.

mod options;
mod pending;

pub use options::SendMessageOptions;
pub use pending::PendingReply;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::accumulator::{ProgressCallback, ResultAccumulator};
use crate::adapters::ReqwestHttpClient;
use crate::config::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::interpreter::{interpret, Interpretation};
use crate::logging::mask_token;
use crate::models::{ChatResult, ConversationNode, ConversationRequest};
use crate::sse::SseParser;
use crate::traits::{Headers, HttpClient, HttpError};

/// Client for the conversation backend.
///
/// Cloning is cheap: clones share the configuration and the HTTP client.
/// Calls are independent of each other.
#[derive(Debug)]
pub struct ChatProxy<C: HttpClient = ReqwestHttpClient> {
    config: Arc<ProxyConfig>,
    http: Arc<C>,
}

impl<C: HttpClient> Clone for ChatProxy<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            http: Arc::clone(&self.http),
        }
    }
}

impl ChatProxy {
    /// Create a proxy using the reqwest transport.
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_http_client(config, ReqwestHttpClient::new())
    }
}

impl<C: HttpClient> ChatProxy<C> {
    /// Create a proxy over any [`HttpClient`].
    pub fn with_http_client(config: ProxyConfig, http: C) -> Self {
        Self {
            config: Arc::new(config),
            http: Arc::new(http),
        }
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Headers sent with every request.
    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        headers.insert(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.access_token),
        );
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("User-Agent".to_string(), self.config.user_agent.clone());
        headers
    }

    /// Send one message and wait for the complete reply.
    ///
    /// `options.on_progress` sees the partial reply each time its text
    /// changes. The call settles exactly once: with the reply, or with
    /// `InvalidRequest`, `Backend`, `Network`, `Timeout` or `Cancelled`.
    pub async fn send_message(
        &self,
        text: &str,
        options: SendMessageOptions,
    ) -> ProxyResult<ChatResult> {
        let request = ConversationRequest::builder(text, self.config.model.as_str())
            .conversation_id(options.conversation_id)
            .parent_message_id(options.parent_message_id)
            .message_id(options.message_id)
            .action(options.action)
            .build()?;

        let deadline = options.timeout.unwrap_or(self.config.timeout);
        // Child token: a timeout must not cancel the caller's token
        let token = options
            .cancellation
            .map(|parent| parent.child_token())
            .unwrap_or_default();

        if token.is_cancelled() {
            debug!("Cancelled before dispatch");
            return Err(ProxyError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ProxyError::Cancelled),
            _ = tokio::time::sleep(deadline) => {
                token.cancel();
                Err(ProxyError::Timeout { duration: deadline })
            }
            result = self.run_exchange(&request, options.on_progress, &token) => result,
        };

        match &outcome {
            Ok(result) => info!(
                conversation_id = ?result.conversation_id,
                message_id = %result.id,
                text_len = result.text.len(),
                "Reply complete"
            ),
            Err(ProxyError::Timeout { duration }) => warn!(
                timeout_ms = duration.as_millis() as u64,
                "Reply timed out"
            ),
            Err(ProxyError::Cancelled) => debug!("Reply cancelled"),
            Err(e) => warn!(error_code = e.error_code(), error = %e, "Reply failed"),
        }
        outcome
    }

    /// POST the request and drive its body to a result.
    async fn run_exchange(
        &self,
        request: &ConversationRequest,
        on_progress: Option<ProgressCallback>,
        token: &CancellationToken,
    ) -> ProxyResult<ChatResult> {
        let body = serde_json::to_string(&request.to_body())
            .map_err(|e| ProxyError::InvalidRequest(e.to_string()))?;

        debug!(
            endpoint = %self.config.endpoint,
            model = %request.model,
            conversation_id = ?request.conversation_id,
            parent_message_id = %request.parent_message_id,
            token = %mask_token(&self.config.access_token),
            "Sending conversation request"
        );

        let mut stream = self
            .http
            .post_stream(&self.config.endpoint, &body, &self.headers())
            .await
            .map_err(|e| {
                if let HttpError::ServerError { status, .. } = &e {
                    warn!(status = *status, "Backend returned error status");
                }
                ProxyError::from(e)
            })?;

        let mut parser = SseParser::new();
        let mut accumulator = ResultAccumulator::new(
            ChatResult::provisional(request.message_id.clone(), request.conversation_id.clone()),
            on_progress,
        );

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;

            for event in parser.feed(&chunk) {
                // A progress callback may have cancelled the call
                if token.is_cancelled() {
                    return Err(ProxyError::Cancelled);
                }

                match interpret(&event) {
                    Interpretation::Complete => {
                        accumulator.complete();
                        return Ok(accumulator.into_result());
                    }
                    Interpretation::Update(update) => {
                        accumulator.apply(update);
                    }
                    Interpretation::Ignored(reason) => {
                        trace!(?reason, "Skipping stream record");
                    }
                }
            }
        }

        if token.is_cancelled() {
            return Err(ProxyError::Cancelled);
        }
        if parser.finish() {
            debug!("Discarding incomplete record at end of stream");
        }
        debug!(
            updates = accumulator.update_count(),
            "Stream ended without terminator, using accumulated reply"
        );
        accumulator.complete();
        Ok(accumulator.into_result())
    }

    /// Id of the latest message in a conversation.
    ///
    /// Uses the configured deadline. A 2xx body without a string
    /// `current_node` is `MalformedResponse`.
    pub async fn get_conversation_last_message_id(
        &self,
        conversation_id: &str,
    ) -> ProxyResult<String> {
        self.lookup(conversation_id, self.config.timeout).await
    }

    async fn lookup(&self, conversation_id: &str, deadline: Duration) -> ProxyResult<String> {
        if conversation_id.is_empty() {
            return Err(ProxyError::InvalidRequest(
                "conversation_id must not be empty".to_string(),
            ));
        }

        let url = self.config.conversation_url(conversation_id);
        debug!(url = %url, "Looking up conversation");

        let response = tokio::time::timeout(deadline, self.http.get(&url, &self.headers()))
            .await
            .map_err(|_| ProxyError::Timeout { duration: deadline })??;

        if !response.is_success() {
            warn!(status = response.status, "Conversation lookup failed");
            return Err(ProxyError::Backend {
                status: response.status,
                body: response.text_lossy(),
            });
        }

        let node: ConversationNode = response
            .json()
            .map_err(|e| ProxyError::MalformedResponse(e.to_string()))?;
        Ok(node.current_node)
    }

    /// Reply within an existing conversation, after its latest message.
    ///
    /// Looks up the conversation's latest message id and sends `text` as its
    /// child. Both steps share one deadline: the send only gets what the
    /// lookup left over. Cancellation in `options` also aborts the lookup.
    pub async fn continue_conversation(
        &self,
        conversation_id: &str,
        text: &str,
        options: SendMessageOptions,
    ) -> ProxyResult<ChatResult> {
        let deadline = options.timeout.unwrap_or(self.config.timeout);
        let started = Instant::now();
        let token = options.cancellation.clone().unwrap_or_default();

        let parent = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ProxyError::Cancelled),
            result = self.lookup(conversation_id, deadline) => result?,
        };

        let remaining = deadline.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(ProxyError::Timeout { duration: deadline });
        }

        let options = options
            .with_conversation_id(conversation_id)
            .with_parent_message_id(parent)
            .with_timeout(remaining);
        match self.send_message(text, options).await {
            Err(ProxyError::Timeout { .. }) => Err(ProxyError::Timeout { duration: deadline }),
            outcome => outcome,
        }
    }
}

impl<C: HttpClient + 'static> ChatProxy<C> {
    /// Run [`send_message`](Self::send_message) on a new task.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn_message(
        &self,
        text: impl Into<String>,
        mut options: SendMessageOptions,
    ) -> PendingReply {
        let token = options.cancellation.clone().unwrap_or_default();
        options.cancellation = Some(token.clone());

        let proxy = self.clone();
        let text = text.into();
        let handle = tokio::spawn(async move { proxy.send_message(&text, options).await });
        PendingReply::new(handle, token)
    }
}
