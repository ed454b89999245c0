//! Data types for the conversation protocol.
//!
//! - `request` - outbound request and its JSON wire body
//! - `message` - the consolidated reply (`ChatResult`)
//! - `delta` - payloads decoded from the response stream

mod delta;
mod message;
mod request;

pub use delta::{ConversationDelta, ConversationNode, DeltaContent, DeltaMessage};
pub use message::{ChatResult, Role};
pub use request::{
    ContentType, ConversationBody, ConversationRequest, ConversationRequestBuilder,
    MessageAction, Prompt, PromptContent,
};
