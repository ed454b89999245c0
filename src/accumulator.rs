//! Holds the in-flight reply and reports progress.

use std::fmt;
use std::sync::Arc;

use crate::interpreter::DeltaUpdate;
use crate::models::ChatResult;

/// Called with a snapshot each time the reply text changes.
pub type ProgressCallback = Arc<dyn Fn(&ChatResult) + Send + Sync>;

/// Accumulates deltas into a single [`ChatResult`].
///
/// Text is replaced, not appended: each delta carries the full text so far.
pub struct ResultAccumulator {
    result: ChatResult,
    on_progress: Option<ProgressCallback>,
    completed: bool,
    updates: usize,
}

impl ResultAccumulator {
    pub fn new(initial: ChatResult, on_progress: Option<ProgressCallback>) -> Self {
        Self {
            result: initial,
            on_progress,
            completed: false,
            updates: 0,
        }
    }

    /// Apply one update. Returns true when the text changed.
    ///
    /// Ignored once the reply is complete.
    pub fn apply(&mut self, update: DeltaUpdate) -> bool {
        if self.completed {
            return false;
        }

        if let Some(conversation_id) = update.conversation_id {
            self.result.conversation_id = Some(conversation_id);
        }
        if let Some(id) = update.message_id {
            self.result.id = id;
        }
        self.updates += 1;

        let changed = match update.text {
            Some(text) if text != self.result.text => {
                self.result.text = text;
                true
            }
            _ => false,
        };

        if changed {
            if let Some(callback) = &self.on_progress {
                callback(&self.result);
            }
        }
        changed
    }

    /// Mark the reply finished.
    pub fn complete(&mut self) {
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Number of updates applied so far.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    pub fn snapshot(&self) -> &ChatResult {
        &self.result
    }

    pub fn into_result(self) -> ChatResult {
        self.result
    }
}

impl fmt::Debug for ResultAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultAccumulator")
            .field("result", &self.result)
            .field("has_progress_callback", &self.on_progress.is_some())
            .field("completed", &self.completed)
            .finish()
    }
}
