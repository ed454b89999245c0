//! Conversation lookup tests using wiremock.
//!
//! These tests verify GET <endpoint>/<conversation_id> and the
//! continue-conversation flow built on it.

mod common;

use std::time::Duration;

use chatproxy::error::ProxyError;
use chatproxy::proxy::SendMessageOptions;
use common::{sse_body, test_config, test_proxy, CONVERSATION_PATH, TEST_TOKEN};
use chatproxy::proxy::ChatProxy;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_lookup_returns_current_node() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/conversation-1", CONVERSATION_PATH)))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .and(header("User-Agent", "curl"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "title": "Rust questions",
            "current_node": "node-42",
            "mapping": {}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let proxy = test_proxy(&mock_server);
    let id = proxy
        .get_conversation_last_message_id("conversation-1")
        .await
        .unwrap();

    assert_eq!(id, "node-42");
}

#[tokio::test]
async fn test_lookup_not_found_is_backend_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/missing", CONVERSATION_PATH)))
        .respond_with(ResponseTemplate::new(404).set_body_string("conversation not found"))
        .mount(&mock_server)
        .await;

    let proxy = test_proxy(&mock_server);
    let result = proxy.get_conversation_last_message_id("missing").await;

    match result {
        Err(ProxyError::Backend { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "conversation not found");
        }
        other => panic!("Expected Backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lookup_without_current_node_is_malformed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/conversation-1", CONVERSATION_PATH)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"current_node": 7})),
        )
        .mount(&mock_server)
        .await;

    let proxy = test_proxy(&mock_server);
    let result = proxy.get_conversation_last_message_id("conversation-1").await;

    assert!(matches!(result, Err(ProxyError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_lookup_uses_configured_deadline() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/conversation-1", CONVERSATION_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"current_node": "node-1"}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let proxy = ChatProxy::new(test_config(&mock_server).with_timeout(Duration::from_millis(150)));
    let result = proxy.get_conversation_last_message_id("conversation-1").await;

    assert!(matches!(result, Err(ProxyError::Timeout { .. })));
}

#[tokio::test]
async fn test_continue_conversation_replies_after_current_node() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/conversation-1", CONVERSATION_PATH)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"current_node": "node-42"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(CONVERSATION_PATH))
        .and(body_partial_json(serde_json::json!({
            "conversation_id": "conversation-1",
            "parent_message_id": "node-42"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["Sure,", "Sure, here it is."]), "text/event-stream"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let proxy = test_proxy(&mock_server);
    let result = proxy
        .continue_conversation("conversation-1", "Go on", SendMessageOptions::new())
        .await
        .unwrap();

    assert_eq!(result.text, "Sure, here it is.");
    assert_eq!(result.conversation_id.as_deref(), Some("conversation-1"));
}

#[tokio::test]
async fn test_continue_conversation_stops_when_lookup_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{}/conversation-1", CONVERSATION_PATH)))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let proxy = test_proxy(&mock_server);
    let result = proxy
        .continue_conversation("conversation-1", "Go on", SendMessageOptions::new())
        .await;

    assert!(matches!(result, Err(ProxyError::Backend { status: 503, .. })));
}

#[tokio::test]
async fn test_continue_conversation_shares_one_deadline() {
    let mock_server = MockServer::start().await;

    // Each step fits the deadline alone, but not both together
    Mock::given(method("GET"))
        .and(path(format!("{}/conversation-1", CONVERSATION_PATH)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"current_node": "node-42"}))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(CONVERSATION_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["Sure."]), "text/event-stream")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let proxy = test_proxy(&mock_server);
    let result = proxy
        .continue_conversation(
            "conversation-1",
            "Go on",
            SendMessageOptions::new().with_timeout(Duration::from_millis(450)),
        )
        .await;

    match result {
        Err(ProxyError::Timeout { duration }) => {
            assert_eq!(duration, Duration::from_millis(450))
        }
        other => panic!("Expected Timeout, got {:?}", other),
    }
}
