//! Audit test utilities

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use engine_audit::engine::types::{Platform, RepoCoordinate};
use engine_audit::version::client::PlatformClient;
use engine_audit::version::clients::PlatformClients;
use engine_audit::version::error::PlatformError;
use engine_audit::version::types::CommitInfo;

/// Upstream state of one fake repository
#[derive(Default, Clone)]
pub struct FakeRepo {
    pub tag: Option<String>,
    /// Newest first
    pub commits: Vec<CommitInfo>,
    pub failing: bool,
}

/// In-memory platform client for testing
pub struct FakeClient {
    platform: Platform,
    repos: HashMap<String, FakeRepo>,
}

impl FakeClient {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            repos: HashMap::new(),
        }
    }

    pub fn with_repo(mut self, full_name: &str, repo: FakeRepo) -> Self {
        self.repos.insert(full_name.to_string(), repo);
        self
    }

    fn repo(&self, coordinate: &RepoCoordinate) -> Result<&FakeRepo, PlatformError> {
        match self.repos.get(&coordinate.full_name()) {
            Some(repo) if repo.failing => {
                Err(PlatformError::InvalidResponse("Unexpected status: 500".to_string()))
            }
            Some(repo) => Ok(repo),
            None => Err(PlatformError::NotFound(coordinate.full_name())),
        }
    }
}

#[async_trait]
impl PlatformClient for FakeClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn latest_tag(&self, repo: &RepoCoordinate) -> Result<Option<String>, PlatformError> {
        Ok(self.repo(repo)?.tag.clone())
    }

    async fn latest_commit(
        &self,
        repo: &RepoCoordinate,
    ) -> Result<Option<CommitInfo>, PlatformError> {
        Ok(self.repo(repo)?.commits.first().cloned())
    }

    async fn commit_timestamp(
        &self,
        repo: &RepoCoordinate,
        commit_id: &str,
    ) -> Result<Option<DateTime<Utc>>, PlatformError> {
        Ok(self
            .repo(repo)?
            .commits
            .iter()
            .find(|c| c.id.starts_with(commit_id))
            .map(|c| c.date))
    }
}

/// Collects fake clients into the runner's client map
pub fn clients(fakes: Vec<FakeClient>) -> PlatformClients {
    fakes
        .into_iter()
        .map(|fake| (fake.platform, Arc::new(fake) as Arc<dyn PlatformClient>))
        .collect()
}

/// Creates `<root>/<name>` with a build script cloning `clone_url` and the given `env.json`
pub fn write_engine(root: &Path, name: &str, clone_url: &str, descriptor: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("build.sh"),
        format!(
            "#!/bin/bash\nset -e\n\ngit clone {clone_url} source\npushd source\ngit checkout $COMMIT_HASH\ngit submodule update --init\npopd\n"
        ),
    )
    .unwrap();
    std::fs::write(dir.join("env.json"), descriptor).unwrap();
}

pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
}
