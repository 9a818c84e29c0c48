use crate::clients::{GithubApiError, GithubClient, RawRepository};
use crate::models::{Repository, RepositoryDetails};

/// Builds domain repositories out of GitHub API records
#[derive(Debug, Clone)]
pub struct RepositoryService {
    client: GithubClient,
}

impl RepositoryService {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }

    /// Searches repositories and returns them sorted by stars, most starred first
    ///
    /// Repositories with equal star counts keep the order GitHub returned them in.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Repository>, GithubApiError> {
        let items = self.client.search_repositories(query, limit).await?;

        let mut repositories: Vec<Repository> =
            items.iter().map(repository_from_raw).collect();
        sort_by_stars(&mut repositories);

        Ok(repositories)
    }

    /// Fetches repository metadata and README together
    ///
    /// Both calls run concurrently. A metadata failure wins over a README
    /// failure; a missing README is reported as `readme: None`.
    pub async fn details(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<RepositoryDetails, GithubApiError> {
        let (metadata, readme) = tokio::join!(
            self.client.get_repository(owner, repo),
            self.client.get_readme(owner, repo)
        );
        let metadata = metadata?;
        let readme = readme?;

        Ok(RepositoryDetails {
            repository: repository_from_raw(&metadata),
            readme,
            topics: metadata.topics.unwrap_or_default(),
            license: metadata.license.and_then(|license| license.name),
            homepage: metadata.homepage,
            created_at: metadata.created_at.unwrap_or_default(),
            updated_at: metadata.updated_at.unwrap_or_default(),
        })
    }
}

/// Stable sort by stars, descending
pub fn sort_by_stars(repositories: &mut [Repository]) {
    repositories.sort_by(|a, b| b.stars.cmp(&a.stars));
}

fn repository_from_raw(raw: &RawRepository) -> Repository {
    Repository {
        name: raw.name.clone().unwrap_or_default(),
        full_name: raw.full_name.clone().unwrap_or_default(),
        description: raw.description.clone(),
        stars: raw.stargazers_count.unwrap_or(0),
        forks: raw.forks_count.unwrap_or(0),
        language: raw.language.clone(),
        url: raw.html_url.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(name: &str, stars: u64) -> Repository {
        Repository {
            name: name.to_string(),
            full_name: format!("owner/{}", name),
            description: None,
            stars,
            forks: 0,
            language: None,
            url: String::new(),
        }
    }

    #[test]
    fn test_sort_by_stars_is_descending_and_stable() {
        let mut repositories = vec![
            repo("a", 10),
            repo("b", 50),
            repo("c", 10),
            repo("d", 50),
            repo("e", 0),
        ];

        sort_by_stars(&mut repositories);

        let names: Vec<&str> = repositories.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "a", "c", "e"]);
    }

    #[test]
    fn test_missing_fields_default_safely() {
        let repository = repository_from_raw(&RawRepository::default());

        assert_eq!(repository.name, "");
        assert_eq!(repository.full_name, "");
        assert_eq!(repository.stars, 0);
        assert_eq!(repository.forks, 0);
        assert_eq!(repository.url, "");
        assert!(repository.description.is_none());
        assert!(repository.language.is_none());
    }
}
