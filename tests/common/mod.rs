//! Shared helpers for integration tests.

#![allow(dead_code)]

use chatproxy::config::ProxyConfig;
use chatproxy::proxy::ChatProxy;
use wiremock::MockServer;

pub const CONVERSATION_PATH: &str = "/api/conversation";
pub const TEST_TOKEN: &str = "test-access-token";
pub const TEST_MODEL: &str = "test-model";

/// Config pointing at the mock server.
pub fn test_config(server: &MockServer) -> ProxyConfig {
    ProxyConfig::default()
        .with_endpoint(format!("{}{}", server.uri(), CONVERSATION_PATH))
        .with_access_token(TEST_TOKEN)
        .with_model(TEST_MODEL)
}

pub fn test_proxy(server: &MockServer) -> ChatProxy {
    ChatProxy::new(test_config(server))
}

/// One SSE record carrying a delta with the full text so far.
pub fn delta_frame(message_id: &str, text: &str, conversation_id: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({
            "message": {
                "id": message_id,
                "role": "assistant",
                "content": {"content_type": "text", "parts": [text]}
            },
            "conversation_id": conversation_id,
            "error": null
        })
    )
}

pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// A complete event stream replying with each text in turn.
pub fn sse_body(texts: &[&str]) -> String {
    let mut body: String = texts
        .iter()
        .map(|text| delta_frame("assistant-1", text, "conversation-1"))
        .collect();
    body.push_str(DONE_FRAME);
    body
}
