use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use ollama_api::{ChatRequest, OllamaApiClient, OllamaApiConfig, OllamaApiError, WireChatMessage};

fn test_client() -> OllamaApiClient {
    OllamaApiClient::new(
        OllamaApiConfig::new("http://127.0.0.1:11434").with_timeout(Duration::from_secs(5)),
    )
    .expect("client should build")
}

fn test_request() -> ChatRequest {
    ChatRequest::new("mixtral", vec![WireChatMessage::new("user", "hello")])
}

#[test]
fn normalized_endpoint_follows_configured_base_url() {
    let client = test_client();
    assert_eq!(
        client.normalized_endpoint(),
        "http://127.0.0.1:11434/api/chat"
    );
}

#[tokio::test]
async fn send_short_circuits_when_already_cancelled() {
    let client = test_client();
    let cancel = Arc::new(AtomicBool::new(true));

    let error = client
        .send(&test_request(), Some(&cancel))
        .await
        .expect_err("pre-cancelled send must not dispatch");

    assert!(matches!(error, OllamaApiError::Cancelled));
}

#[tokio::test]
async fn stream_short_circuits_when_already_cancelled() {
    let client = test_client();
    let cancel = Arc::new(AtomicBool::new(true));

    let error = client
        .stream(&test_request(), Some(&cancel))
        .await
        .expect_err("pre-cancelled stream must not dispatch");

    assert!(matches!(error, OllamaApiError::Cancelled));
}
