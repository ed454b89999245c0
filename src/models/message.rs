use serde::{Deserialize, Serialize};

use super::request::new_id;

/// Author of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[default]
    Assistant,
    System,
}

/// The consolidated reply of one exchange.
///
/// Starts with provisional ids and is rewritten in place as deltas arrive.
/// `text` always holds the latest full text, never a concatenation of deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResult {
    /// Assistant message id (backend-assigned once known)
    pub id: String,
    pub text: String,
    pub role: Role,
    /// Id of the user message this replies to
    pub parent_message_id: String,
    pub conversation_id: Option<String>,
}

impl ChatResult {
    /// A fresh, empty assistant reply with a generated id.
    pub fn provisional(parent_message_id: impl Into<String>, conversation_id: Option<String>) -> Self {
        Self {
            id: new_id(),
            text: String::new(),
            role: Role::Assistant,
            parent_message_id: parent_message_id.into(),
            conversation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisional_result() {
        let result = ChatResult::provisional("msg-1", Some("conv-1".to_string()));

        assert!(!result.id.is_empty());
        assert!(result.text.is_empty());
        assert_eq!(result.role, Role::Assistant);
        assert_eq!(result.parent_message_id, "msg-1");
        assert_eq!(result.conversation_id.as_deref(), Some("conv-1"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }
}
