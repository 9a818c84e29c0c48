//! Static catalog of the tools this server exposes

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::ToolName;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Map<String, Value>,
}

impl ToolDefinition {
    fn new(name: ToolName, description: &str, input_schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema: input_schema.as_object().cloned().unwrap_or_default(),
        }
    }
}

/// The three tool definitions, in a fixed order
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            ToolName::SearchGithubLibrary,
            "Search for GitHub repositories by library name. Returns a list of repositories sorted by stars.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Library name or search query"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results to return (default: 10)",
                        "default": 10
                    }
                },
                "required": ["query"]
            }),
        ),
        ToolDefinition::new(
            ToolName::GetRepositoryDetails,
            "Get detailed information about a specific GitHub repository including README content.",
            json!({
                "type": "object",
                "properties": {
                    "owner": {
                        "type": "string",
                        "description": "Repository owner username"
                    },
                    "repo": {
                        "type": "string",
                        "description": "Repository name"
                    }
                },
                "required": ["owner", "repo"]
            }),
        ),
        ToolDefinition::new(
            ToolName::GenerateUsageGuide,
            "Generate a comprehensive usage guide for a GitHub library using LLM and save it as a markdown file.",
            json!({
                "type": "object",
                "properties": {
                    "owner": {
                        "type": "string",
                        "description": "Repository owner username"
                    },
                    "repo": {
                        "type": "string",
                        "description": "Repository name"
                    },
                    "output_path": {
                        "type": "string",
                        "description": "Optional custom output path for the generated document",
                        "default": null
                    }
                },
                "required": ["owner", "repo"]
            }),
        ),
    ]
}

/// Payload of a `tools/list` response
pub fn list_tools() -> Value {
    json!({ "tools": tool_definitions() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_and_required_fields() {
        let definitions = tool_definitions();
        let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "search_github_library",
                "get_repository_details",
                "generate_usage_guide"
            ]
        );

        assert_eq!(definitions[0].input_schema["required"], json!(["query"]));
        assert_eq!(definitions[1].input_schema["required"], json!(["owner", "repo"]));
        assert_eq!(definitions[2].input_schema["required"], json!(["owner", "repo"]));
        assert_eq!(definitions[0].input_schema["properties"]["limit"]["default"], json!(10));
    }

    #[test]
    fn test_list_serializes_input_schema_key() {
        let listed = list_tools();
        let first = &listed["tools"][0];

        assert!(first.get("inputSchema").is_some());
        assert!(first.get("input_schema").is_none());
        assert_eq!(first["inputSchema"]["type"], "object");
    }
}
