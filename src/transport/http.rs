use std::net::SocketAddr;

use anyhow::Result;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::{Value, json};

use crate::error::{ErrorBody, ErrorCode};
use crate::tools::{McpHandler, McpRequest, McpResponse};

pub const SERVICE_NAME: &str = "gitguide-mcp";

/// HTTP front end for the dispatcher
pub struct HttpServerApp {
    bind_addr: SocketAddr,
    handler: McpHandler,
}

impl HttpServerApp {
    pub fn new(bind_addr: SocketAddr, handler: McpHandler) -> Self {
        Self { bind_addr, handler }
    }

    /// Serves until Ctrl+C is received
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind_addr).await?;
        tracing::info!("Listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router(self.handler))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down HTTP server");
            })
            .await?;

        Ok(())
    }
}

/// Routes: `POST /mcp`, `GET /health` and `GET /`
pub fn router(handler: McpHandler) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/mcp", post(handle_mcp))
        .with_state(handler)
}

async fn handle_mcp(
    State(handler): State<McpHandler>,
    body: Bytes,
) -> (StatusCode, Json<McpResponse>) {
    let request: McpRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected malformed request body: {}", e);
            let error = ErrorBody::new(
                ErrorCode::ValidationError,
                format!("Invalid request body: {}", e),
            );
            return (StatusCode::BAD_REQUEST, Json(McpResponse::error(error)));
        }
    };

    let response = handler.handle_request(request).await;
    (StatusCode::OK, Json(response))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "mcp": "POST /mcp",
            "health": "GET /health"
        }
    }))
}
