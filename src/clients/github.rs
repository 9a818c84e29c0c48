use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::retry::RetryPolicy;

/// Default GitHub REST API endpoint
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Retries applied to timeouts and transport failures
pub const MAX_RETRIES: u32 = 3;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!(
    "gitguide-mcp/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/tacogips/gitguide-mcp)"
);

/// GitHub search page size limits
const MIN_PER_PAGE: u32 = 1;
const MAX_PER_PAGE: u32 = 100;

/// Errors surfaced by [`GithubClient`]
///
/// Authentication, rate-limit, not-found and other status failures are returned
/// immediately. Only timeouts and transport failures are retried, and surface as
/// [`GithubApiError::Timeout`] / [`GithubApiError::Transport`] once the retry
/// budget is spent.
#[derive(Debug, Error)]
pub enum GithubApiError {
    #[error("GitHub API authentication failed. Please check your token.")]
    Authentication,

    #[error("GitHub API rate limit exceeded.")]
    RateLimited,

    #[error("GitHub resource not found: {resource}")]
    NotFound { resource: String },

    #[error("GitHub API error {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("GitHub API request timed out after {attempts} attempts.")]
    Timeout { attempts: u32 },

    #[error("GitHub API request failed after {attempts} attempts: {message}")]
    Transport { attempts: u32, message: String },

    #[error("Failed to parse GitHub response: {0}")]
    InvalidResponse(String),

    #[error("Failed to decode README content: {0}")]
    ReadmeDecode(String),

    #[error("Failed to initialize GitHub HTTP client: {0}")]
    ClientInit(String),
}

impl GithubApiError {
    /// HTTP status associated with the failure, when there is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GithubApiError::Authentication => Some(401),
            GithubApiError::RateLimited => Some(403),
            GithubApiError::NotFound { .. } => Some(404),
            GithubApiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Repository record as returned by the GitHub API
///
/// Every field is optional so that missing upstream data never fails a request;
/// defaults are applied when converting into the domain model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRepository {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub description: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub language: Option<String>,
    pub html_url: Option<String>,
    pub topics: Option<Vec<String>>,
    pub license: Option<RawLicense>,
    pub homepage: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Nested license object of a repository record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLicense {
    pub name: Option<String>,
}

/// GitHub repository search response
#[derive(Debug, Deserialize)]
struct RepositorySearchResponse {
    #[serde(default)]
    items: Vec<RawRepository>,
}

/// GitHub README response, `content` is base64 encoded
#[derive(Debug, Deserialize)]
struct ReadmeResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Client for the GitHub REST API
///
/// Every request carries the bearer token, the v3 accept header and a fixed
/// user agent, and targets a single base endpoint.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    github_token: String,
    base_url: String,
    retry_policy: RetryPolicy,
}

impl GithubClient {
    /// Creates a client against `base_url` (e.g. [`DEFAULT_GITHUB_API_URL`])
    pub fn new(
        github_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GithubApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GithubApiError::ClientInit(e.to_string()))?;

        Ok(Self {
            client,
            github_token: github_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry_policy: RetryPolicy::with_max_retries(MAX_RETRIES),
        })
    }

    /// Replaces the default retry policy (3 retries, 1s base delay)
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Searches repositories sorted by stars, returning at most `limit` raw records
    ///
    /// `limit` is clamped to GitHub's page size bounds (1..=100).
    pub async fn search_repositories(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<RawRepository>, GithubApiError> {
        let per_page = limit.clamp(MIN_PER_PAGE, MAX_PER_PAGE);
        let path = format!(
            "/search/repositories?q={}&sort=stars&order=desc&per_page={}",
            urlencoding::encode(query),
            per_page
        );

        let response: RepositorySearchResponse = self.get_json(&path).await?;
        tracing::debug!(
            "GitHub search for '{}' returned {} items",
            query,
            response.items.len()
        );
        Ok(response.items)
    }

    /// Fetches repository metadata; a missing repository is an error
    pub async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RawRepository, GithubApiError> {
        let path = format!(
            "/repos/{}/{}",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        self.get_json(&path).await
    }

    /// Fetches and decodes the repository README
    ///
    /// A 404 from the README endpoint means the repository has no README and is
    /// reported as `Ok(None)`. Invalid base64 or non UTF-8 content is an error.
    pub async fn get_readme(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<String>, GithubApiError> {
        let path = format!(
            "/repos/{}/{}/readme",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );

        let response: ReadmeResponse = match self.get_json(&path).await {
            Ok(response) => response,
            Err(GithubApiError::NotFound { .. }) => {
                tracing::debug!("No README found for {}/{}", owner, repo);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        match response.content {
            Some(content) if !content.is_empty() => decode_readme(&content).map(Some),
            _ => Ok(None),
        }
    }

    /// Sends a GET request and deserializes the JSON body
    ///
    /// Timeouts and transport failures are retried according to the retry
    /// policy; HTTP status failures are translated and returned immediately.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GithubApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;

        let (status, body) = loop {
            match self.fetch(&url).await {
                Ok(result) => break result,
                Err(e) if self.retry_policy.should_retry(attempt) => {
                    let delay = self.retry_policy.delay_for(attempt);
                    tracing::warn!(
                        "GitHub request to {} failed ({}), retrying in {:?}",
                        path,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    let attempts = attempt + 1;
                    return Err(if e.is_timeout() {
                        GithubApiError::Timeout { attempts }
                    } else {
                        GithubApiError::Transport {
                            attempts,
                            message: e.to_string(),
                        }
                    });
                }
            }
        };

        let body = check_status(status, body, path)?;
        serde_json::from_str(&body).map_err(|e| GithubApiError::InvalidResponse(e.to_string()))
    }

    /// Single request attempt, reading the full body
    async fn fetch(&self, url: &str) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.github_token))
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}

/// Translates an HTTP status into the client's error vocabulary
fn check_status(
    status: StatusCode,
    body: String,
    resource: &str,
) -> Result<String, GithubApiError> {
    match status.as_u16() {
        401 => Err(GithubApiError::Authentication),
        403 => Err(GithubApiError::RateLimited),
        404 => Err(GithubApiError::NotFound {
            resource: resource.to_string(),
        }),
        code if code >= 400 => Err(GithubApiError::Upstream { status: code, body }),
        _ => Ok(body),
    }
}

/// Decodes GitHub's line-wrapped base64 README payload
fn decode_readme(content: &str) -> Result<String, GithubApiError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| GithubApiError::ReadmeDecode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| GithubApiError::ReadmeDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_status_translation() {
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, String::new(), "/x"),
            Err(GithubApiError::Authentication)
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN, String::new(), "/x"),
            Err(GithubApiError::RateLimited)
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, String::new(), "/x"),
            Err(GithubApiError::NotFound { .. })
        ));

        match check_status(StatusCode::UNPROCESSABLE_ENTITY, "bad query".to_string(), "/x") {
            Err(GithubApiError::Upstream { status, body }) => {
                assert_eq!(status, 422);
                assert_eq!(body, "bad query");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        assert_eq!(
            check_status(StatusCode::OK, "{}".to_string(), "/x").unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_status_code_propagation() {
        assert_eq!(GithubApiError::Authentication.status_code(), Some(401));
        assert_eq!(GithubApiError::RateLimited.status_code(), Some(403));
        assert_eq!(
            GithubApiError::Upstream {
                status: 502,
                body: String::new()
            }
            .status_code(),
            Some(502)
        );
        assert_eq!(GithubApiError::Timeout { attempts: 4 }.status_code(), None);
    }

    #[test]
    fn test_decode_readme_with_line_wrapping() {
        // "# Hello\nWorld" split the way GitHub wraps it
        let encoded = "IyBIZWxs\nbwpXb3Js\nZA==\n";
        assert_eq!(decode_readme(encoded).unwrap(), "# Hello\nWorld");
    }

    #[test]
    fn test_decode_readme_rejects_invalid_payloads() {
        assert!(matches!(
            decode_readme("not base64!!"),
            Err(GithubApiError::ReadmeDecode(_))
        ));
        // 0xff 0xfe is valid base64 but not UTF-8
        assert!(matches!(
            decode_readme("//4="),
            Err(GithubApiError::ReadmeDecode(_))
        ));
    }
}
