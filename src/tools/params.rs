//! Typed argument structs for each tool
//!
//! Arguments arrive as a loose JSON object. Each struct validates its own
//! fields so that no downstream call is made with a missing or empty value.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::ToolError;
use crate::services::DocumentStore;

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Arguments of `search_github_library`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLibraryArgs {
    pub query: String,
    pub limit: u32,
}

/// Arguments of `get_repository_details`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryArgs {
    pub owner: String,
    pub repo: String,
}

/// Arguments of `generate_usage_guide`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateGuideArgs {
    pub owner: String,
    pub repo: String,
    pub output_path: Option<String>,
}

impl SearchLibraryArgs {
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, ToolError> {
        let query = require(arguments, "query")?;
        let limit = match arguments.get("limit") {
            None | Some(Value::Null) => DEFAULT_SEARCH_LIMIT,
            Some(value) => value
                .as_u64()
                .map(|limit| u32::try_from(limit).unwrap_or(u32::MAX))
                .ok_or_else(|| {
                    ToolError::Validation(format!(
                        "Parameter 'limit' must be a non-negative integer, got {}",
                        value
                    ))
                })?,
        };

        Ok(Self { query, limit })
    }
}

impl RepositoryArgs {
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, ToolError> {
        Ok(Self {
            owner: require(arguments, "owner")?,
            repo: require(arguments, "repo")?,
        })
    }
}

impl GenerateGuideArgs {
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, ToolError> {
        let owner = require(arguments, "owner")?;
        let repo = require(arguments, "repo")?;
        let output_path = optional(arguments, "output_path")?;
        if let Some(path) = &output_path {
            if !DocumentStore::is_contained(Path::new(path)) {
                return Err(ToolError::Validation(format!(
                    "Parameter 'output_path' must stay inside the output directory, got '{}'",
                    path
                )));
            }
        }

        Ok(Self {
            owner,
            repo,
            output_path,
        })
    }
}

/// Reads a required, non-blank string argument
fn require(arguments: &Map<String, Value>, name: &'static str) -> Result<String, ToolError> {
    optional(arguments, name)?.ok_or(ToolError::MissingParameter(name))
}

/// Reads an optional string argument, treating null and blank as absent
fn optional(
    arguments: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, ToolError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.trim().is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(ToolError::Validation(format!(
            "Parameter '{}' must be a string, got {}",
            name, other
        ))),
    }
}
