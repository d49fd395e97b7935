//! GitLab REST API client, for gitlab.com and self-hosted instances

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::engine::types::{Platform, RepoCoordinate};
use crate::version::client::PlatformClient;
use crate::version::clients::{fetch_json, http_client};
use crate::version::error::PlatformError;
use crate::version::types::CommitInfo;

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Commit {
    id: String,
    committed_date: DateTime<Utc>,
}

/// Client for the GitLab v4 API
pub struct GitLabClient {
    client: reqwest::Client,
    base_url: String,
    platform: Platform,
}

impl GitLabClient {
    /// Client for gitlab.com
    pub fn new(base_url: &str) -> Self {
        Self::with_platform(base_url, Platform::GitLab)
    }

    /// Client for a GitLab-compatible instance on another host
    pub fn self_hosted(base_url: &str) -> Self {
        Self::with_platform(base_url, Platform::SelfHostedGitLab)
    }

    fn with_platform(base_url: &str, platform: Platform) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            platform,
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url, path))
    }
}

/// GitLab addresses projects by their URL-encoded full path
fn project_id(repo: &RepoCoordinate) -> String {
    repo.full_name().replace('/', "%2F")
}

#[async_trait::async_trait]
impl PlatformClient for GitLabClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn latest_tag(&self, repo: &RepoCoordinate) -> Result<Option<String>, PlatformError> {
        // Listed by last update, newest first
        let path = format!("/projects/{}/repository/tags", project_id(repo));
        let tags: Vec<Tag> = fetch_json(self.get(&path), &path).await?;
        Ok(tags.into_iter().next().map(|t| t.name))
    }

    async fn latest_commit(
        &self,
        repo: &RepoCoordinate,
    ) -> Result<Option<CommitInfo>, PlatformError> {
        let path = format!(
            "/projects/{}/repository/commits?per_page=1",
            project_id(repo)
        );
        let commits: Vec<Commit> = fetch_json(self.get(&path), &path).await?;

        Ok(commits.into_iter().next().map(|c| CommitInfo {
            id: c.id,
            date: c.committed_date,
        }))
    }

    async fn commit_timestamp(
        &self,
        repo: &RepoCoordinate,
        commit_id: &str,
    ) -> Result<Option<DateTime<Utc>>, PlatformError> {
        let path = format!(
            "/projects/{}/repository/commits/{}",
            project_id(repo),
            commit_id
        );

        match fetch_json::<Commit>(self.get(&path), &path).await {
            Ok(commit) => Ok(Some(commit.committed_date)),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
