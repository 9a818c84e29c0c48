//! HTTP clients for the two upstream APIs
//!
//! - [`github::GithubClient`]: GitHub REST search and repository reads
//! - [`llm::LlmClient`]: chat completions for guide generation
//!
//! Both share the bounded exponential backoff in [`retry::RetryPolicy`].

pub mod github;
pub mod llm;
pub mod retry;

pub use github::{GithubApiError, GithubClient, RawLicense, RawRepository};
pub use llm::{LlmApiError, LlmClient};
pub use retry::RetryPolicy;
