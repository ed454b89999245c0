//! Payloads the backend sends back.
//!
//! Decoding is lenient: every field is optional and unknown fields are
//! ignored, since the backend adds metadata freely.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One decoded `data:` payload from the conversation stream.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ConversationDelta {
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message: Option<DeltaMessage>,
    /// Backend-reported error text, usually null
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DeltaMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Option<DeltaContent>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DeltaContent {
    #[serde(default)]
    pub content_type: Option<String>,
    /// Raw parts. Only a leading string part carries reply text; null or
    /// non-string parts must not sink the ids decoded alongside them.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parts: Vec<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ConversationDelta {
    /// First content part of the message, if there is one.
    pub fn first_part(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.content.as_ref())
            .and_then(|c| c.parts.first())
            .and_then(Value::as_str)
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.id.as_deref())
    }
}

/// Response of the conversation lookup endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversationNode {
    /// Id of the latest message in the conversation
    pub current_node: String,
}
