//! HTTP backend tests against a mocked chat API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mynah::api::backends::http::HttpBackend;

const SEND_FAILED: &str = "Failed to send message. Please check your connection and try again.";

fn backend(server: &MockServer) -> HttpBackend {
    HttpBackend::new(server.uri(), 1_000).unwrap()
}

#[tokio::test]
async fn send_decodes_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Hi there!",
            "conversationId": "conv-1",
            "usage": { "prompt_tokens": 12, "completion_tokens": 34 },
        })))
        .mount(&server)
        .await;

    let reply = backend(&server).send("Hello", None).await.unwrap();
    assert_eq!(reply.text(), Some("Hi there!"));
    assert_eq!(reply.conversation_id.as_deref(), Some("conv-1"));
    let usage = reply.usage.unwrap();
    assert_eq!(usage.input_tokens, 12);
    assert_eq!(usage.output_tokens, 34);
}

#[tokio::test]
async fn send_accepts_reply_field_and_bare_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "From reply" })))
        .mount(&server)
        .await;

    let reply = backend(&server).send("Hello", None).await.unwrap();
    assert_eq!(reply.text(), Some("From reply"));
    assert!(reply.conversation_id.is_none());
    assert!(reply.usage.is_none());
}

#[tokio::test]
async fn send_omits_absent_conversation_id_from_wire() {
    let server = MockServer::start().await;
    // Exact body match: no `conversationId` key at all on the first exchange.
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "Hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server).send("Hello", None).await.unwrap();
}

#[tokio::test]
async fn send_carries_conversation_id_on_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "Again", "conversationId": "conv-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server).send("Again", Some("conv-1")).await.unwrap();
}

#[tokio::test]
async fn send_surfaces_error_envelope_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "model overloaded" })),
        )
        .mount(&server)
        .await;

    let err = backend(&server).send("Hello", None).await.unwrap_err();
    assert_eq!(err.to_string(), "model overloaded");
}

#[tokio::test]
async fn send_falls_back_on_unparseable_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let err = backend(&server).send("Hello", None).await.unwrap_err();
    assert_eq!(err.to_string(), SEND_FAILED);
}

#[tokio::test]
async fn send_times_out_with_fixed_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "too late" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let slow = HttpBackend::new(server.uri(), 100).unwrap();
    let err = slow.send("Hello", None).await.unwrap_err();
    assert_eq!(err.to_string(), SEND_FAILED);
}

#[tokio::test]
async fn conversation_history_returns_array_verbatim() {
    let server = MockServer::start().await;
    let history = json!([
        { "text": "Hello", "sender": "user" },
        { "text": "Hi!", "sender": "assistant" },
    ]);
    Mock::given(method("GET"))
        .and(path("/conversation/conv-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(history.clone()))
        .mount(&server)
        .await;

    let fetched = backend(&server)
        .conversation_history("conv-1")
        .await
        .unwrap();
    assert_eq!(fetched, history);
}

#[tokio::test]
async fn conversation_history_failure_has_fixed_description() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversation/conv-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = backend(&server)
        .conversation_history("conv-1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to load conversation history.");
}

#[tokio::test]
async fn clear_conversation_issues_delete() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/conversation/conv-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    backend(&server).clear_conversation("conv-1").await.unwrap();
}

#[tokio::test]
async fn clear_conversation_failure_has_fixed_description() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/conversation/conv-1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = backend(&server)
        .clear_conversation("conv-1")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Failed to clear conversation.");
}

#[tokio::test]
async fn health_check_true_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(backend(&server).health_check().await);
}

#[tokio::test]
async fn health_check_false_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(!backend(&server).health_check().await);
}

#[tokio::test]
async fn health_check_false_when_unreachable() {
    // Discard port — nothing listens there.
    let unreachable = HttpBackend::new("http://127.0.0.1:9".to_string(), 500).unwrap();
    assert!(!unreachable.health_check().await);
}
