//! Tests for the chat-completions client
//!
//! A mockito server stands in for the LLM API. Retry tests use a millisecond
//! backoff so the full retry budget runs quickly.

use std::time::Duration;

use gitguide_mcp::clients::{LlmClient, RetryPolicy};
use mockito::Matcher;
use serde_json::json;

fn client_for(server: &mockito::Server) -> LlmClient {
    LlmClient::new("sk-test", "gpt-4", server.url())
        .expect("Failed to create LLM client")
        .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(1)))
}

fn completion(content: serde_json::Value) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_complete_sends_prompt_and_returns_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({ "model": "gpt-4", "max_tokens": 2000 })),
            Matcher::Regex(r#""messages":\[\{"role":"user","content":"Write a guide"\}\]"#.to_string()),
        ]))
        .with_status(200)
        .with_body(completion(json!("# Guide")))
        .expect(1)
        .create_async()
        .await;

    let content = client_for(&server).complete("Write a guide").await.unwrap();

    mock.assert_async().await;
    assert_eq!(content, "# Guide");
}

#[tokio::test]
async fn test_missing_content_yields_empty_string() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion(serde_json::Value::Null))
        .create_async()
        .await;

    let content = client_for(&server).complete("hi").await.unwrap();
    assert_eq!(content, "");
}

#[tokio::test]
async fn test_authentication_failure_is_tagged_and_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided"}}"#)
        .expect(1)
        .create_async()
        .await;

    let error = client_for(&server).complete("hi").await.unwrap_err();

    mock.assert_async().await;
    assert!(error.is_auth_error());
}

#[tokio::test]
async fn test_rate_limit_is_retried_then_untagged() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
        .expect(3)
        .create_async()
        .await;

    let error = client_for(&server).complete("hi").await.unwrap_err();

    mock.assert_async().await;
    assert!(!error.is_auth_error());
    assert!(error.message().contains("rate limit"));
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("upstream unavailable")
        .expect(3)
        .create_async()
        .await;

    let error = client_for(&server).complete("hi").await.unwrap_err();

    mock.assert_async().await;
    assert!(!error.is_auth_error());
    assert!(error.to_string().contains("503"));
}

#[tokio::test]
async fn test_malformed_body_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("this is not json")
        .expect(1)
        .create_async()
        .await;

    let error = client_for(&server).complete("hi").await.unwrap_err();

    mock.assert_async().await;
    assert!(!error.is_auth_error());
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    assert!(client_for(&server).complete("hi").await.is_err());
}
