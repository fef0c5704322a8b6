//! Translation gateway client tests
//!
//! Exercises the request shape and the failure taxonomy against a local
//! mock server.

use babel_relay::{GatewayClient, GatewayError, Language};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/test-model:generateContent";

fn client(server: &MockServer) -> GatewayClient {
    GatewayClient::new("test-model").with_base_url(server.uri())
}

#[tokio::test]
async fn translate_extracts_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(query_param("key", "k-1"))
        .and(body_string_contains("Return ONLY the translation"))
        .and(body_string_contains("Translate this English text to Vietnamese"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Xin chào"}]}}]
        })))
        .mount(&server)
        .await;

    let result = client(&server)
        .translate("Hello", Language::English, "k-1")
        .await
        .unwrap();
    assert_eq!(result, "Xin chào");
}

#[tokio::test]
async fn translate_direction_follows_detected_source() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("Translate this Vietnamese text to English"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Hello"}]}}]
        })))
        .mount(&server)
        .await;

    let result = client(&server)
        .translate("Xin chào", Language::Vietnamese, "k-1")
        .await
        .unwrap();
    assert_eq!(result, "Hello");
}

#[tokio::test]
async fn http_error_status_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = client(&server)
        .translate("Hello", Language::English, "k-1")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_failure() {
    let gateway = GatewayClient::new("test-model").with_base_url("http://127.0.0.1:9");

    let err = gateway
        .translate("Hello", Language::English, "k-1")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn empty_candidates_is_a_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = client(&server)
        .translate("Hello", Language::English, "k-1")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::MalformedResponse(_)));
}

#[tokio::test]
async fn missing_parts_is_a_malformed_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": []}}]
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .translate("Hello", Language::English, "k-1")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::MalformedResponse(_)));
}

#[tokio::test]
async fn transcribe_sends_inline_audio() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("Transcribe this audio"))
        .and(body_string_contains("\"mimeType\":\"audio/wav\""))
        .and(body_string_contains("QUFBQQ=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "hello there"}]}}]
        })))
        .mount(&server)
        .await;

    let result = client(&server).transcribe("QUFBQQ==", "k-1").await.unwrap();
    assert_eq!(result, "hello there");
}

#[tokio::test]
async fn transcribe_shares_the_failure_taxonomy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client(&server).transcribe("QUFBQQ==", "k-1").await.unwrap_err();
    assert!(matches!(err, GatewayError::MalformedResponse(_)));
}
