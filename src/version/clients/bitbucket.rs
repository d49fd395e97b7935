//! Bitbucket Cloud REST API client

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::engine::types::{Platform, RepoCoordinate};
use crate::version::client::PlatformClient;
use crate::version::clients::{fetch_json, http_client};
use crate::version::error::PlatformError;
use crate::version::types::CommitInfo;

/// Paginated listing envelope
#[derive(Debug, Deserialize)]
struct Page<T> {
    values: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Repository {
    mainbranch: Option<Branch>,
}

#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Commit {
    hash: String,
    date: DateTime<Utc>,
}

/// Client for the Bitbucket Cloud 2.0 API
pub struct BitbucketClient {
    client: reqwest::Client,
    base_url: String,
}

impl BitbucketClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url, path))
    }

    async fn main_branch(&self, repo: &RepoCoordinate) -> Result<Option<String>, PlatformError> {
        let path = format!("/repositories/{}", repo.full_name());
        let repository: Repository = fetch_json(self.get(&path), &path).await?;
        Ok(repository.mainbranch.map(|b| b.name))
    }
}

#[async_trait::async_trait]
impl PlatformClient for BitbucketClient {
    fn platform(&self) -> Platform {
        Platform::Bitbucket
    }

    async fn latest_tag(&self, repo: &RepoCoordinate) -> Result<Option<String>, PlatformError> {
        // Newest tag target first
        let path = format!(
            "/repositories/{}/refs/tags?sort=-target.date",
            repo.full_name()
        );
        let page: Page<Tag> = fetch_json(self.get(&path), &path).await?;
        Ok(page.values.into_iter().next().map(|t| t.name))
    }

    async fn latest_commit(
        &self,
        repo: &RepoCoordinate,
    ) -> Result<Option<CommitInfo>, PlatformError> {
        // The bare commit listing spans every branch, so scope it to the main one
        let Some(branch) = self.main_branch(repo).await? else {
            return Ok(None);
        };
        let path = format!(
            "/repositories/{}/commits/{}?pagelen=1",
            repo.full_name(),
            branch
        );
        let page: Page<Commit> = fetch_json(self.get(&path), &path).await?;

        Ok(page.values.into_iter().next().map(|c| CommitInfo {
            id: c.hash,
            date: c.date,
        }))
    }

    async fn commit_timestamp(
        &self,
        repo: &RepoCoordinate,
        commit_id: &str,
    ) -> Result<Option<DateTime<Utc>>, PlatformError> {
        let path = format!("/repositories/{}/commit/{}", repo.full_name(), commit_id);

        match fetch_json::<Commit>(self.get(&path), &path).await {
            Ok(commit) => Ok(Some(commit.date)),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
