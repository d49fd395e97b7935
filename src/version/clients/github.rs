//! GitHub REST API client

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::engine::types::{Platform, RepoCoordinate};
use crate::version::client::PlatformClient;
use crate::version::clients::{fetch_json, http_client};
use crate::version::error::PlatformError;
use crate::version::types::CommitInfo;

const API_VERSION: &str = "2022-11-28";

/// Response from the latest release endpoint
#[derive(Debug, Deserialize)]
struct Release {
    tag_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Commit {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
    author: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: DateTime<Utc>,
}

impl Commit {
    fn date(&self) -> Option<DateTime<Utc>> {
        self.commit
            .committer
            .as_ref()
            .or(self.commit.author.as_ref())
            .map(|s| s.date)
    }
}

/// Client for the GitHub REST API
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a new GitHubClient; `token` is sent as a bearer token when present
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: http_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn latest_release(&self, repo: &RepoCoordinate) -> Result<Option<String>, PlatformError> {
        let path = format!("/repos/{}/releases/latest", repo.full_name());
        let release: Release = fetch_json(self.get(&path), &path).await?;
        Ok(release.tag_name.filter(|t| !t.is_empty()))
    }

    async fn newest_listed_tag(
        &self,
        repo: &RepoCoordinate,
    ) -> Result<Option<String>, PlatformError> {
        let path = format!("/repos/{}/tags", repo.full_name());
        let tags: Vec<Tag> = fetch_json(self.get(&path), &path).await?;
        Ok(tags.into_iter().next().map(|t| t.name))
    }
}

#[async_trait::async_trait]
impl PlatformClient for GitHubClient {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    /// Prefers the latest release; any failure falls back to the tag list.
    async fn latest_tag(&self, repo: &RepoCoordinate) -> Result<Option<String>, PlatformError> {
        match self.latest_release(repo).await {
            Ok(tag) => Ok(tag),
            Err(e) => {
                debug!(
                    "No latest release for {}: {}. Falling back to tags.",
                    repo.full_name(),
                    e
                );
                self.newest_listed_tag(repo).await
            }
        }
    }

    async fn latest_commit(
        &self,
        repo: &RepoCoordinate,
    ) -> Result<Option<CommitInfo>, PlatformError> {
        let path = format!("/repos/{}/commits?per_page=1", repo.full_name());
        let commits: Vec<Commit> = fetch_json(self.get(&path), &path).await?;

        let Some(commit) = commits.into_iter().next() else {
            return Ok(None);
        };
        let date = commit.date().ok_or_else(|| {
            PlatformError::InvalidResponse(format!("commit {} has no date", commit.sha))
        })?;

        Ok(Some(CommitInfo { id: commit.sha, date }))
    }

    async fn commit_timestamp(
        &self,
        repo: &RepoCoordinate,
        commit_id: &str,
    ) -> Result<Option<DateTime<Utc>>, PlatformError> {
        let path = format!("/repos/{}/commits/{}", repo.full_name(), commit_id);

        match fetch_json::<Commit>(self.get(&path), &path).await {
            Ok(commit) => Ok(commit.date()),
            Err(PlatformError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
