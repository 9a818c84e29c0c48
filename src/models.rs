//! Domain models for repositories
//!
//! These are the provider-independent shapes returned by the tools. They are
//! built once from upstream records and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// A repository as returned by `search_github_library`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name (without owner)
    pub name: String,

    /// `owner/name`, unique identifier of the repository
    pub full_name: String,

    pub description: Option<String>,

    /// Number of stargazers, 0 when absent upstream
    pub stars: u64,

    /// Number of forks, 0 when absent upstream
    pub forks: u64,

    /// Primary programming language
    pub language: Option<String>,

    /// URL for viewing the repository in a browser
    pub url: String,
}

/// Detail aggregate returned by `get_repository_details`
///
/// Timestamps are passed through exactly as the provider formats them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDetails {
    pub repository: Repository,

    /// Decoded README text, absent when the repository has none
    pub readme: Option<String>,

    pub topics: Vec<String>,

    /// License display name
    pub license: Option<String>,

    pub homepage: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}
