//! Request and response envelopes of the tool protocol
//!
//! A request is `{"method": ..., "params": {...}}`. A response is exactly one
//! of `{"result": ...}` or `{"error": {"code", "message", "details"?}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{ErrorBody, ToolError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpRequest {
    pub method: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl McpRequest {
    pub fn new(method: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// A `tools/call` request for `name` with the given arguments
    pub fn call(name: &str, arguments: Value) -> Self {
        let mut params = Map::new();
        params.insert("name".to_string(), Value::String(name.to_string()));
        params.insert("arguments".to_string(), arguments);
        Self::new("tools/call", params)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpResponse {
    Result(Value),
    Error(ErrorBody),
}

impl McpResponse {
    /// Wraps a tool payload as `{"content": payload}`
    pub fn success(content: Value) -> Self {
        McpResponse::Result(json!({ "content": content }))
    }

    pub fn error(body: ErrorBody) -> Self {
        McpResponse::Error(body)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, McpResponse::Error(_))
    }

    pub fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            McpResponse::Error(body) => Some(body),
            McpResponse::Result(_) => None,
        }
    }

    /// The `content` member of a successful result
    pub fn content(&self) -> Option<&Value> {
        match self {
            McpResponse::Result(result) => result.get("content"),
            McpResponse::Error(_) => None,
        }
    }
}

impl From<ToolError> for McpResponse {
    fn from(error: ToolError) -> Self {
        McpResponse::Error(error.to_body())
    }
}
