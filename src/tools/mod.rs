//! Protocol dispatcher
//!
//! [`McpHandler`] routes `tools/list` and `tools/call` requests to the domain
//! services and turns every outcome into an [`McpResponse`]. Each request runs
//! in its own task, so even a panicking tool still produces a well-formed
//! `INTERNAL_ERROR` response.

pub mod definitions;
pub mod params;
pub mod responses;

use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use strum::{AsRefStr, Display, EnumString};

use crate::clients::{GithubClient, LlmClient};
use crate::config::Config;
use crate::error::ToolError;
use crate::services::{DocumentStore, GuideService, RepositoryService};

pub use definitions::{ToolDefinition, list_tools, tool_definitions};
pub use params::{GenerateGuideArgs, RepositoryArgs, SearchLibraryArgs};
pub use responses::{McpRequest, McpResponse};

pub const LIST_TOOLS_METHOD: &str = "tools/list";
pub const CALL_TOOL_METHOD: &str = "tools/call";

const GUIDE_GENERATED_MESSAGE: &str = "Usage guide generated successfully";

/// Names of the exposed tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    SearchGithubLibrary,
    GetRepositoryDetails,
    GenerateUsageGuide,
}

struct HandlerInner {
    repositories: RepositoryService,
    guides: GuideService,
    documents: DocumentStore,
}

/// Routes protocol requests to the services
///
/// Cloning is cheap; all clones share the same services.
#[derive(Clone)]
pub struct McpHandler {
    inner: Arc<HandlerInner>,
}

impl McpHandler {
    pub fn new(
        repositories: RepositoryService,
        guides: GuideService,
        documents: DocumentStore,
    ) -> Self {
        Self {
            inner: Arc::new(HandlerInner {
                repositories,
                guides,
                documents,
            }),
        }
    }

    /// Builds the clients and services described by `config`
    pub fn from_config(config: &Config) -> Result<Self, ToolError> {
        let github = GithubClient::new(
            config.github_token.clone(),
            config.github_api_base_url.clone(),
        )?;
        let llm = LlmClient::new(
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            config.llm_api_base_url.clone(),
        )?;

        Ok(Self::new(
            RepositoryService::new(github),
            GuideService::new(llm),
            DocumentStore::new(config.output_dir.clone()),
        ))
    }

    /// Handles one protocol request
    ///
    /// Never fails: every error, including a panic inside a tool, is rendered
    /// as an error response.
    pub async fn handle_request(&self, request: McpRequest) -> McpResponse {
        tracing::debug!("Handling request: method={}", request.method);

        let handler = self.clone();
        let method = request.method.clone();
        let response = run_contained(async move { handler.dispatch(request).await }).await;

        if let Some(body) = response.error_body() {
            tracing::warn!(
                "Request {} failed: {} ({})",
                method,
                body.message,
                body.code
            );
        }
        response
    }

    async fn dispatch(&self, request: McpRequest) -> Result<Value, ToolError> {
        match request.method.as_str() {
            LIST_TOOLS_METHOD => Ok(list_tools()),
            CALL_TOOL_METHOD => {
                let name = request
                    .params
                    .get("name")
                    .and_then(Value::as_str)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| ToolError::InvalidParams("Tool name is required".to_string()))?;

                let arguments = match request.params.get("arguments") {
                    None | Some(Value::Null) => Map::new(),
                    Some(Value::Object(arguments)) => arguments.clone(),
                    Some(_) => {
                        return Err(ToolError::InvalidParams(
                            "Tool arguments must be an object".to_string(),
                        ));
                    }
                };

                self.call_tool(name, &arguments).await
            }
            other => Err(ToolError::MethodNotFound(other.to_string())),
        }
    }

    /// Runs a tool by name and returns its payload
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<Value, ToolError> {
        let tool =
            ToolName::from_str(name).map_err(|_| ToolError::ToolNotFound(name.to_string()))?;
        tracing::debug!("Calling tool {}", tool);

        match tool {
            ToolName::SearchGithubLibrary => {
                let args = SearchLibraryArgs::from_arguments(arguments)?;
                self.search_github_library(args).await
            }
            ToolName::GetRepositoryDetails => {
                let args = RepositoryArgs::from_arguments(arguments)?;
                self.get_repository_details(args).await
            }
            ToolName::GenerateUsageGuide => {
                let args = GenerateGuideArgs::from_arguments(arguments)?;
                self.generate_usage_guide(args).await
            }
        }
    }

    async fn search_github_library(&self, args: SearchLibraryArgs) -> Result<Value, ToolError> {
        let repositories = self.inner.repositories.search(&args.query, args.limit).await?;
        tracing::info!(
            "Found {} repositories for query '{}'",
            repositories.len(),
            args.query
        );
        to_payload(&repositories)
    }

    async fn get_repository_details(&self, args: RepositoryArgs) -> Result<Value, ToolError> {
        let details = self.inner.repositories.details(&args.owner, &args.repo).await?;
        to_payload(&details)
    }

    async fn generate_usage_guide(&self, args: GenerateGuideArgs) -> Result<Value, ToolError> {
        let details = self.inner.repositories.details(&args.owner, &args.repo).await?;
        let guide = self.inner.guides.generate_guide(&details).await;

        let full_name = details.repository.full_name;
        let filename = args
            .output_path
            .unwrap_or_else(|| DocumentStore::filename_for(&full_name));
        let filepath = self.inner.documents.save(&filename, &guide.content, true)?;

        tracing::info!(
            "Generated usage guide for {} at {} ({})",
            full_name,
            filepath.display(),
            guide.source
        );

        Ok(json!({
            "message": GUIDE_GENERATED_MESSAGE,
            "filepath": filepath.display().to_string(),
            "repository": full_name,
            "source": guide.source,
        }))
    }
}

fn to_payload<T: serde::Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|e| ToolError::Execution(e.to_string()))
}

/// Runs `future` on its own task and maps its outcome onto a response
///
/// A panic or cancellation of the task becomes `INTERNAL_ERROR`.
pub(crate) async fn run_contained<F>(future: F) -> McpResponse
where
    F: Future<Output = Result<Value, ToolError>> + Send + 'static,
{
    match tokio::spawn(future).await {
        Ok(Ok(content)) => McpResponse::success(content),
        Ok(Err(e)) => McpResponse::from(e),
        Err(join_error) => {
            let reason = if join_error.is_panic() {
                let payload = join_error.into_panic();
                payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "tool task panicked".to_string())
            } else {
                join_error.to_string()
            };
            tracing::error!("Tool task failed: {}", reason);
            McpResponse::from(ToolError::Internal(reason))
        }
    }
}
