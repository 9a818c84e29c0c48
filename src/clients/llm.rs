//! Chat-completions client used for guide generation
//!
//! Talks to an OpenAI compatible `/chat/completions` endpoint. Sampling
//! parameters are fixed for every call; only the prompt varies.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::retry::RetryPolicy;

/// Default chat-completions API endpoint
pub const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1";

/// Default model identifier
pub const DEFAULT_LLM_MODEL: &str = "gpt-4";

/// Retries applied to rate-limit, upstream and transport failures
pub const MAX_RETRIES: u32 = 2;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 2000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Failure of a completion call
///
/// `is_auth_error` distinguishes rejected credentials from every other failure
/// so callers can report them differently.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LlmApiError {
    message: String,
    is_auth_error: bool,
}

impl LlmApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_auth_error: false,
        }
    }

    pub fn authentication() -> Self {
        Self {
            message: "LLM API authentication failed. Please check your API key.".to_string(),
            is_auth_error: true,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_auth_error(&self) -> bool {
        self.is_auth_error
    }
}

/// Outcome of a single request attempt
#[derive(Debug)]
enum AttemptError {
    Authentication,
    RateLimited,
    Upstream { status: u16, body: String },
    Transport(String),
    Malformed(String),
}

impl AttemptError {
    fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttemptError::RateLimited | AttemptError::Upstream { .. } | AttemptError::Transport(_)
        )
    }

    fn into_api_error(self) -> LlmApiError {
        match self {
            AttemptError::Authentication => LlmApiError::authentication(),
            AttemptError::RateLimited => {
                LlmApiError::new("LLM API rate limit exceeded after retries.")
            }
            AttemptError::Upstream { status, body } => {
                LlmApiError::new(format!("LLM API error {}: {}", status, body))
            }
            AttemptError::Transport(message) => {
                LlmApiError::new(format!("LLM API request failed: {}", message))
            }
            AttemptError::Malformed(message) => {
                LlmApiError::new(format!("Unexpected LLM error: {}", message))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for the chat-completions API
#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl LlmClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, LlmApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                LlmApiError::new(format!("Failed to initialize LLM HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::with_max_retries(MAX_RETRIES),
        })
    }

    /// Replaces the default retry policy (2 retries, 1s base delay)
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Generates a completion for a single user prompt
    ///
    /// Authentication failures return immediately with `is_auth_error` set.
    /// Rate-limit, upstream status and transport failures are retried; a
    /// malformed response body is not.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmApiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && self.retry_policy.should_retry(attempt) => {
                    let delay = self.retry_policy.delay_for(attempt);
                    tracing::warn!("LLM request failed ({:?}), retrying in {:?}", e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into_api_error()),
            }
        }
    }

    async fn send_once(&self, request: &ChatRequest<'_>) -> Result<String, AttemptError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        match status.as_u16() {
            401 => return Err(AttemptError::Authentication),
            429 => return Err(AttemptError::RateLimited),
            code if code >= 400 => {
                return Err(AttemptError::Upstream { status: code, body });
            }
            _ => {}
        }

        let response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AttemptError::Malformed(e.to_string()))?;

        let Some(choice) = response.choices.into_iter().next() else {
            return Err(AttemptError::Malformed(
                "response contained no choices".to_string(),
            ));
        };

        Ok(choice.message.and_then(|m| m.content).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_failures_are_retryable() {
        assert!(!AttemptError::Authentication.is_retryable());
        assert!(!AttemptError::Malformed("x".to_string()).is_retryable());
        assert!(AttemptError::RateLimited.is_retryable());
        assert!(AttemptError::Transport("reset".to_string()).is_retryable());
        assert!(
            AttemptError::Upstream {
                status: 500,
                body: String::new()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_auth_tag_survives_conversion() {
        assert!(AttemptError::Authentication.into_api_error().is_auth_error());
        assert!(!AttemptError::RateLimited.into_api_error().is_auth_error());
        assert!(
            !AttemptError::Malformed("eof".to_string())
                .into_api_error()
                .is_auth_error()
        );
    }

    #[test]
    fn test_request_carries_fixed_sampling_parameters() {
        let request = ChatRequest {
            model: "gpt-4",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4");
        assert_eq!(value["max_tokens"], 2000);
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
    }
}
