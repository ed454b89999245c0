use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Role;
use crate::error::{ProxyError, ProxyResult};

/// Whether the backend should produce the next reply or regenerate one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageAction {
    #[default]
    Next,
    /// Regenerate an alternative reply to the same parent
    Variant,
}

impl MessageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageAction::Next => "next",
            MessageAction::Variant => "variant",
        }
    }
}

impl std::str::FromStr for MessageAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(MessageAction::Next),
            "variant" => Ok(MessageAction::Variant),
            other => Err(format!("unknown action '{}', expected next or variant", other)),
        }
    }
}

/// A validated request for one conversational exchange.
///
/// Construct through [`ConversationRequest::builder`]; `build` enforces that
/// the conversation id and the parent message id are given together.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationRequest {
    pub prompt: String,
    pub model: String,
    /// None starts a new conversation
    pub conversation_id: Option<String>,
    pub parent_message_id: String,
    /// Id of the user message being sent
    pub message_id: String,
    pub action: MessageAction,
}

impl ConversationRequest {
    pub fn builder(
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> ConversationRequestBuilder {
        ConversationRequestBuilder {
            prompt: prompt.into(),
            model: model.into(),
            conversation_id: None,
            parent_message_id: None,
            message_id: None,
            action: MessageAction::Next,
        }
    }

    /// Whether this request continues an existing conversation.
    pub fn is_continuation(&self) -> bool {
        self.conversation_id.is_some()
    }

    /// The JSON body sent to the conversation endpoint.
    pub fn to_body(&self) -> ConversationBody {
        ConversationBody {
            action: self.action,
            conversation_id: self.conversation_id.clone(),
            messages: vec![Prompt {
                id: self.message_id.clone(),
                role: Role::User,
                content: PromptContent {
                    content_type: ContentType::Text,
                    parts: vec![self.prompt.clone()],
                },
            }],
            model: self.model.clone(),
            parent_message_id: self.parent_message_id.clone(),
        }
    }
}

/// Builder for [`ConversationRequest`].
#[derive(Debug, Clone)]
pub struct ConversationRequestBuilder {
    prompt: String,
    model: String,
    conversation_id: Option<String>,
    parent_message_id: Option<String>,
    message_id: Option<String>,
    action: MessageAction,
}

impl ConversationRequestBuilder {
    pub fn conversation_id(mut self, id: Option<String>) -> Self {
        self.conversation_id = id;
        self
    }

    pub fn parent_message_id(mut self, id: Option<String>) -> Self {
        self.parent_message_id = id;
        self
    }

    pub fn message_id(mut self, id: Option<String>) -> Self {
        self.message_id = id;
        self
    }

    pub fn action(mut self, action: MessageAction) -> Self {
        self.action = action;
        self
    }

    /// Validate and fill in generated ids.
    ///
    /// Empty strings count as absent. Fails with
    /// [`ProxyError::InvalidRequest`] when exactly one of conversation id and
    /// parent message id is present.
    pub fn build(self) -> ProxyResult<ConversationRequest> {
        let conversation_id = non_empty(self.conversation_id);
        let parent_message_id = non_empty(self.parent_message_id);

        if conversation_id.is_some() != parent_message_id.is_some() {
            return Err(ProxyError::InvalidRequest(
                "conversation_id and parent_message_id must both be set or both be unset"
                    .to_string(),
            ));
        }

        Ok(ConversationRequest {
            prompt: self.prompt,
            model: self.model,
            conversation_id,
            parent_message_id: parent_message_id.unwrap_or_else(new_id),
            message_id: non_empty(self.message_id).unwrap_or_else(new_id),
            action: self.action,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Wire body of the conversation POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationBody {
    pub action: MessageAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub messages: Vec<Prompt>,
    pub model: String,
    pub parent_message_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub role: Role,
    pub content: PromptContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContent {
    pub content_type: ContentType,
    pub parts: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
}
