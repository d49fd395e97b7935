//! SourceForge client speaking the git protocol
//!
//! SourceForge offers no REST API for tags or commits, so this client drives
//! the `git` binary: `ls-remote` for tags and a shallow scratch clone for
//! commit data. Every scratch clone lives in its own uniquely named temporary
//! directory that is removed on all exit paths.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::engine::types::{Platform, RepoCoordinate};
use crate::version::client::PlatformClient;
use crate::version::error::PlatformError;
use crate::version::staleness::hashes_match;
use crate::version::types::{CommitInfo, CommitProbe};

const TAG_REF_PREFIX: &str = "refs/tags/";
const SCRATCH_PREFIX: &str = "engine-audit-";

/// Client for SourceForge-hosted git repositories
pub struct SourceForgeClient {
    base_url: String,
    scratch_root: Option<PathBuf>,
    clone_depth: u32,
}

impl SourceForgeClient {
    /// Creates a client cloning from `<base_url>/<project>/<repo>`
    ///
    /// Scratch clones go under `scratch_root`, or the system temp dir when `None`.
    pub fn new(base_url: &str, scratch_root: Option<PathBuf>, clone_depth: u32) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            scratch_root,
            clone_depth,
        }
    }

    fn clone_url(&self, repo: &RepoCoordinate) -> String {
        format!("{}/{}", self.base_url, repo.full_name())
    }

    async fn scratch_clone(&self, repo: &RepoCoordinate) -> Result<ScratchClone, PlatformError> {
        ScratchClone::create(
            &self.clone_url(repo),
            self.scratch_root.as_deref(),
            self.clone_depth,
        )
        .await
    }
}

#[async_trait::async_trait]
impl PlatformClient for SourceForgeClient {
    fn platform(&self) -> Platform {
        Platform::SourceForge
    }

    async fn latest_tag(&self, repo: &RepoCoordinate) -> Result<Option<String>, PlatformError> {
        let url = self.clone_url(repo);
        // Ascending version order, so the newest tag is listed last
        let listing = git(
            &["ls-remote", "--tags", "--refs", "--sort=v:refname", &url],
            None,
        )
        .await?;

        let newest = listing
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .filter_map(|(_, reference)| reference.strip_prefix(TAG_REF_PREFIX))
            .last();

        Ok(newest.map(str::to_string))
    }

    async fn latest_commit(
        &self,
        repo: &RepoCoordinate,
    ) -> Result<Option<CommitInfo>, PlatformError> {
        let scratch = self.scratch_clone(repo).await?;
        let result = scratch.head().await;
        scratch.remove();
        result.map(Some)
    }

    async fn commit_timestamp(
        &self,
        repo: &RepoCoordinate,
        commit_id: &str,
    ) -> Result<Option<DateTime<Utc>>, PlatformError> {
        let scratch = self.scratch_clone(repo).await?;
        let result = scratch.timestamp_of(commit_id).await;
        scratch.remove();
        result
    }

    /// Answers from a single scratch clone instead of cloning per lookup.
    async fn probe_commit(
        &self,
        repo: &RepoCoordinate,
        pinned: &str,
    ) -> Result<Option<CommitProbe>, PlatformError> {
        let scratch = self.scratch_clone(repo).await?;
        let result = probe_in(&scratch, pinned).await;
        scratch.remove();
        result.map(Some)
    }
}

async fn probe_in(scratch: &ScratchClone, pinned: &str) -> Result<CommitProbe, PlatformError> {
    let latest = scratch.head().await?;
    if hashes_match(pinned, &latest.id) {
        return Ok(CommitProbe {
            latest,
            pinned_date: None,
        });
    }

    let pinned_date = scratch.timestamp_of(pinned).await?;
    Ok(CommitProbe {
        latest,
        pinned_date,
    })
}

/// Shallow bare clone in a private temporary directory
struct ScratchClone {
    dir: TempDir,
}

impl ScratchClone {
    async fn create(url: &str, root: Option<&Path>, depth: u32) -> Result<Self, PlatformError> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix(SCRATCH_PREFIX);
            builder
        };
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        debug!("Cloning {} into {}", url, dir.path().display());
        let depth = depth.to_string();
        let target = dir.path().to_string_lossy().into_owned();
        git(
            &["clone", "--quiet", "--bare", "--depth", &depth, url, &target],
            None,
        )
        .await?;

        Ok(Self { dir })
    }

    async fn head(&self) -> Result<CommitInfo, PlatformError> {
        let line = git(&["log", "-1", "--format=%H %ct", "HEAD"], Some(self.dir.path())).await?;
        let (id, timestamp) = line
            .split_once(' ')
            .ok_or_else(|| PlatformError::Git(format!("unexpected log output: {line}")))?;

        Ok(CommitInfo {
            id: id.to_string(),
            date: parse_timestamp(timestamp)?,
        })
    }

    /// Resolves a possibly abbreviated id to the commit's timestamp
    ///
    /// Returns `Ok(None)` when the id is unknown or outside the clone depth.
    async fn timestamp_of(&self, commit_id: &str) -> Result<Option<DateTime<Utc>>, PlatformError> {
        if commit_id.is_empty() || !commit_id.chars().all(|c| c.is_ascii_hexdigit()) {
            warn!("Not a commit id: {}", commit_id);
            return Ok(None);
        }

        let revision = format!("{commit_id}^{{commit}}");
        let resolved = git(
            &["rev-parse", "--verify", "--quiet", &revision],
            Some(self.dir.path()),
        )
        .await;
        let full_id = match resolved {
            Ok(full_id) => full_id,
            Err(PlatformError::Git(_)) => {
                warn!("Commit {} not found in scratch clone", commit_id);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let timestamp = git(&["log", "-1", "--format=%ct", &full_id], Some(self.dir.path())).await?;
        parse_timestamp(&timestamp).map(Some)
    }

    fn remove(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove scratch clone {}: {}", path.display(), e);
        }
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, PlatformError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| PlatformError::Git(format!("invalid commit timestamp: {raw}")))
}

/// Runs git and returns its trimmed stdout
async fn git(args: &[&str], dir: Option<&Path>) -> Result<String, PlatformError> {
    let mut command = Command::new("git");
    command
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .kill_on_drop(true);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    let output = command.output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PlatformError::Git(format!(
            "git {} failed: {}",
            args.first().unwrap_or(&""),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
