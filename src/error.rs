//! Error vocabulary of the tool protocol
//!
//! Every failure reaching the dispatcher becomes a [`ToolError`], which in turn
//! renders as an [`ErrorBody`] tagged with one [`ErrorCode`].

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

use crate::clients::{GithubApiError, LlmApiError};
use crate::config::ConfigError;
use crate::services::DocumentError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidParams,
    MethodNotFound,
    ToolNotFound,
    MissingParameter,
    GithubApiError,
    LlmApiError,
    ToolExecutionError,
    DocumentError,
    ConfigurationError,
    ValidationError,
    InternalError,
}

/// The `error` member of a response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidParams(String),

    #[error("Unknown method: {0}")]
    MethodNotFound(String),

    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    #[error("Required parameter '{0}' is missing")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Github(#[from] GithubApiError),

    #[error(transparent)]
    Llm(#[from] LlmApiError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("{0}")]
    Validation(String),

    #[error("Tool execution failed: {0}")]
    Execution(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ToolError::InvalidParams(_) => ErrorCode::InvalidParams,
            ToolError::MethodNotFound(_) => ErrorCode::MethodNotFound,
            ToolError::ToolNotFound(_) => ErrorCode::ToolNotFound,
            ToolError::MissingParameter(_) => ErrorCode::MissingParameter,
            ToolError::Github(_) => ErrorCode::GithubApiError,
            ToolError::Llm(_) => ErrorCode::LlmApiError,
            ToolError::Document(_) => ErrorCode::DocumentError,
            ToolError::Configuration(_) => ErrorCode::ConfigurationError,
            ToolError::Validation(_) => ErrorCode::ValidationError,
            ToolError::Execution(_) => ErrorCode::ToolExecutionError,
            ToolError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Structured details attached to the envelope, if any
    pub fn details(&self) -> Option<Value> {
        match self {
            ToolError::Github(e) => Some(json!({ "status_code": e.status_code() })),
            ToolError::MissingParameter(name) => Some(json!({ "parameter": name })),
            ToolError::Llm(e) => Some(json!({ "is_auth_error": e.is_auth_error() })),
            _ => None,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

impl From<ToolError> for ErrorBody {
    fn from(error: ToolError) -> Self {
        error.to_body()
    }
}
