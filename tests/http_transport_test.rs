//! Tests for the HTTP transport
//!
//! The router is served on an ephemeral port and exercised with reqwest.
//! No upstream API is contacted by any of these requests.

use std::net::SocketAddr;

use gitguide_mcp::clients::{GithubClient, LlmClient};
use gitguide_mcp::services::{DocumentStore, GuideService, RepositoryService};
use gitguide_mcp::tools::McpHandler;
use gitguide_mcp::transport::http::router;
use serde_json::{Value, json};

async fn spawn_server() -> SocketAddr {
    let handler = McpHandler::new(
        RepositoryService::new(GithubClient::new("ghp_test", "http://127.0.0.1:9").unwrap()),
        GuideService::new(LlmClient::new("sk-test", "gpt-4", "http://127.0.0.1:9").unwrap()),
        DocumentStore::new(std::env::temp_dir()),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(handler)).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_health_endpoint() {
    let addr = spawn_server().await;

    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "healthy", "service": "gitguide-mcp" }));
}

#[tokio::test]
async fn test_root_endpoint_lists_endpoints() {
    let addr = spawn_server().await;

    let body: Value = reqwest::get(format!("http://{}/", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["service"], "gitguide-mcp");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["endpoints"]["mcp"], "POST /mcp");
}

#[tokio::test]
async fn test_mcp_tools_list() {
    let addr = spawn_server().await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/mcp", addr))
        .json(&json!({ "method": "tools/list" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["result"]["content"]["tools"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_mcp_error_envelope_is_http_ok() {
    let addr = spawn_server().await;

    let body: Value = reqwest::Client::new()
        .post(format!("http://{}/mcp", addr))
        .json(&json!({ "method": "tools/call", "params": { "name": "search_github_library", "arguments": {} } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["error"]["code"], "MISSING_PARAMETER");
    assert!(body.get("result").is_none());
}

#[tokio::test]
async fn test_mcp_malformed_body() {
    let addr = spawn_server().await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/mcp", addr))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
