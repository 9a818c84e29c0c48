use std::sync::Arc;

use anyhow::Result;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;

use crate::tools::{McpHandler, McpRequest, McpResponse, tool_definitions};

const FALLBACK_ENVELOPE: &str =
    r#"{"error":{"code":"INTERNAL_ERROR","message":"Internal error: response could not be encoded"}}"#;

/// Exposes the dispatcher as an MCP server
#[derive(Clone)]
pub struct McpToolServer {
    handler: McpHandler,
}

impl McpToolServer {
    pub fn new(handler: McpHandler) -> Self {
        Self { handler }
    }
}

impl ServerHandler for McpToolServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "# GitHub Library Guide MCP Server

## Available Tools
- `search_github_library`: Search GitHub repositories by library name, sorted by stars
- `get_repository_details`: Repository metadata and README content
- `generate_usage_guide`: Generate a markdown usage guide and save it to the output directory

Every tool returns a JSON envelope, either {\"result\": {\"content\": ...}} or
{\"error\": {\"code\", \"message\", \"details\"}}."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::Error> {
        let tools = tool_definitions()
            .into_iter()
            .map(|definition| {
                Tool::new(
                    definition.name,
                    definition.description,
                    Arc::new(definition.input_schema),
                )
            })
            .collect();

        Ok(ListToolsResult {
            next_cursor: None,
            tools,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::Error> {
        let arguments = request.arguments.map(Value::Object).unwrap_or(Value::Null);
        let response = self
            .handler
            .handle_request(McpRequest::call(&request.name, arguments))
            .await;

        Ok(into_call_result(&response))
    }
}

fn into_call_result(response: &McpResponse) -> CallToolResult {
    let text = serde_json::to_string_pretty(response).unwrap_or_else(|e| {
        tracing::error!("Failed to encode response: {}", e);
        FALLBACK_ENVELOPE.to_string()
    });

    if response.is_error() {
        CallToolResult::error(vec![Content::text(text)])
    } else {
        CallToolResult::success(vec![Content::text(text)])
    }
}

/// Serves MCP over stdin/stdout until the client disconnects
pub async fn run_stdio_server(handler: McpHandler) -> Result<()> {
    let server = McpToolServer::new(handler).serve(stdio()).await?;

    server.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use serde_json::json;

    #[test]
    fn test_error_envelope_flags_call_result() {
        let result = into_call_result(&McpResponse::from(ToolError::ToolNotFound(
            "missing".to_string(),
        )));
        assert_eq!(result.is_error, Some(true));

        let result = into_call_result(&McpResponse::success(json!([])));
        assert_eq!(result.is_error, Some(false));
    }
}
