use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::accumulator::ProgressCallback;
use crate::models::{ChatResult, MessageAction};

/// Per-call options for [`ChatProxy::send_message`](super::ChatProxy::send_message).
///
/// # Example
///
/// ```ignore
/// let options = SendMessageOptions::new()
///     .with_conversation_id("conv-1")
///     .with_parent_message_id("msg-9")
///     .with_timeout(Duration::from_secs(30))
///     .with_progress(|partial| println!("{}", partial.text));
/// ```
#[derive(Clone, Default)]
pub struct SendMessageOptions {
    pub conversation_id: Option<String>,
    pub parent_message_id: Option<String>,
    /// Id for the outgoing user message; generated when absent
    pub message_id: Option<String>,
    pub action: MessageAction,
    /// Overrides the configured deadline
    pub timeout: Option<Duration>,
    pub on_progress: Option<ProgressCallback>,
    /// Cancelling this token aborts the call
    pub cancellation: Option<CancellationToken>,
}

impl SendMessageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_parent_message_id(mut self, id: impl Into<String>) -> Self {
        self.parent_message_id = Some(id.into());
        self
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_action(mut self, action: MessageAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register a callback invoked with the partial reply whenever its text
    /// changes.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&ChatResult) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

impl fmt::Debug for SendMessageOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendMessageOptions")
            .field("conversation_id", &self.conversation_id)
            .field("parent_message_id", &self.parent_message_id)
            .field("message_id", &self.message_id)
            .field("action", &self.action)
            .field("timeout", &self.timeout)
            .field("has_progress_callback", &self.on_progress.is_some())
            .field("cancellation", &self.cancellation)
            .finish()
    }
}
