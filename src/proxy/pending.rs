use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{ProxyError, ProxyResult};
use crate::models::ChatResult;

/// A call running on its own task.
///
/// Dropping the handle does not stop the call; use [`PendingReply::cancel`].
#[derive(Debug)]
pub struct PendingReply {
    handle: JoinHandle<ProxyResult<ChatResult>>,
    token: CancellationToken,
}

impl PendingReply {
    pub(crate) fn new(handle: JoinHandle<ProxyResult<ChatResult>>, token: CancellationToken) -> Self {
        Self { handle, token }
    }

    /// Abort the call. Its outcome becomes `Cancelled` unless it already
    /// finished.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token wired into the call, for sharing with other cancel sources.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the call to settle.
    pub async fn outcome(self) -> ProxyResult<ChatResult> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(ProxyError::Cancelled),
        }
    }
}
