//! Maps decoded stream records onto conversation semantics.
//!
//! Each record's data is either the `[DONE]` sentinel or a JSON
//! [`ConversationDelta`]. Interpretation is pure; applying the result is the
//! accumulator's job.

use crate::models::ConversationDelta;
use crate::sse::StreamEvent;

/// Payload that marks the end of a reply.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Outcome of decoding one payload as a delta.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedDelta {
    Ok(ConversationDelta),
    /// Payload was not a valid delta; carries the decode error text
    Malformed(String),
}

/// Decode a data payload, never failing.
pub fn decode_delta(data: &str) -> DecodedDelta {
    match serde_json::from_str::<ConversationDelta>(data) {
        Ok(delta) => DecodedDelta::Ok(delta),
        Err(e) => DecodedDelta::Malformed(e.to_string()),
    }
}

/// Changes one delta asks for. Absent fields leave the result untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeltaUpdate {
    pub conversation_id: Option<String>,
    pub message_id: Option<String>,
    /// Full reply text so far
    pub text: Option<String>,
}

impl DeltaUpdate {
    pub fn is_empty(&self) -> bool {
        self.conversation_id.is_none() && self.message_id.is_none() && self.text.is_none()
    }
}

/// What the controller should do with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpretation {
    /// The reply is finished
    Complete,
    Update(DeltaUpdate),
    /// Nothing to apply
    Ignored(IgnoreReason),
}

/// Why a record produced nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not a data record (e.g. a reconnect interval)
    NotData,
    Malformed(String),
    /// Valid delta without any usable field
    Empty,
}

/// Interpret one record from the frame parser.
pub fn interpret(event: &StreamEvent) -> Interpretation {
    if !event.is_event() {
        return Interpretation::Ignored(IgnoreReason::NotData);
    }
    interpret_data(&event.data)
}

/// Interpret a raw data payload.
pub fn interpret_data(data: &str) -> Interpretation {
    if data == DONE_SENTINEL {
        return Interpretation::Complete;
    }

    let delta = match decode_delta(data) {
        DecodedDelta::Ok(delta) => delta,
        DecodedDelta::Malformed(reason) => {
            tracing::trace!(reason = %reason, "Discarding malformed delta");
            return Interpretation::Ignored(IgnoreReason::Malformed(reason));
        }
    };

    if let Some(error) = delta.error.as_deref().filter(|e| !e.is_empty()) {
        tracing::debug!(error = %error, "Backend reported error in delta");
    }

    let update = DeltaUpdate {
        conversation_id: non_empty(delta.conversation_id.as_deref()),
        message_id: non_empty(delta.message_id()),
        text: non_empty(delta.first_part()),
    };

    if update.is_empty() {
        Interpretation::Ignored(IgnoreReason::Empty)
    } else {
        Interpretation::Update(update)
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
