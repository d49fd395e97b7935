//! Capability trait implemented once per hosting platform

#[cfg(test)]
use mockall::automock;

use chrono::{DateTime, Utc};

use crate::engine::types::{Platform, RepoCoordinate};
use crate::version::error::PlatformError;
use crate::version::staleness::hashes_match;
use crate::version::types::{CommitInfo, CommitProbe};

/// Trait for querying a hosting platform about an upstream repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PlatformClient: Send + Sync {
    /// Returns the platform this implementation handles
    fn platform(&self) -> Platform;

    /// Fetches the newest tag, or `None` when the repository has no tags
    async fn latest_tag(&self, repo: &RepoCoordinate) -> Result<Option<String>, PlatformError>;

    /// Fetches the newest commit on the default branch
    async fn latest_commit(
        &self,
        repo: &RepoCoordinate,
    ) -> Result<Option<CommitInfo>, PlatformError>;

    /// Fetches the timestamp of a (possibly abbreviated) commit id
    ///
    /// # Returns
    /// * `Ok(None)` - The commit does not exist upstream
    async fn commit_timestamp(
        &self,
        repo: &RepoCoordinate,
        commit_id: &str,
    ) -> Result<Option<DateTime<Utc>>, PlatformError>;

    /// Gathers everything needed to judge a pinned commit
    ///
    /// The pinned commit's timestamp is only looked up when the pin differs
    /// from the newest commit.
    async fn probe_commit(
        &self,
        repo: &RepoCoordinate,
        pinned: &str,
    ) -> Result<Option<CommitProbe>, PlatformError> {
        let Some(latest) = self.latest_commit(repo).await? else {
            return Ok(None);
        };

        if hashes_match(pinned, &latest.id) {
            return Ok(Some(CommitProbe {
                latest,
                pinned_date: None,
            }));
        }

        let pinned_date = self.commit_timestamp(repo, pinned).await?;
        Ok(Some(CommitProbe {
            latest,
            pinned_date,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Client answering from fixed values, relying on the provided `probe_commit`
    struct FixedClient {
        latest: Option<CommitInfo>,
        pinned_date: Option<DateTime<Utc>>,
        timestamp_calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl PlatformClient for FixedClient {
        fn platform(&self) -> Platform {
            Platform::GitHub
        }

        async fn latest_tag(&self, _repo: &RepoCoordinate) -> Result<Option<String>, PlatformError> {
            Ok(None)
        }

        async fn latest_commit(
            &self,
            _repo: &RepoCoordinate,
        ) -> Result<Option<CommitInfo>, PlatformError> {
            Ok(self.latest.clone())
        }

        async fn commit_timestamp(
            &self,
            _repo: &RepoCoordinate,
            _commit_id: &str,
        ) -> Result<Option<DateTime<Utc>>, PlatformError> {
            self.timestamp_calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(self.pinned_date)
        }
    }

    fn repo() -> RepoCoordinate {
        RepoCoordinate::new(Platform::GitHub, "acme", "widget")
    }

    fn date(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn probe_commit_skips_timestamp_lookup_for_matching_pin() {
        let client = FixedClient {
            latest: Some(CommitInfo::new("abc1234def", date(10))),
            pinned_date: Some(date(1)),
            timestamp_calls: Default::default(),
        };

        let probe = client.probe_commit(&repo(), "abc1234").await.unwrap().unwrap();

        assert_eq!(probe.pinned_date, None);
        assert_eq!(
            client
                .timestamp_calls
                .load(std::sync::atomic::Ordering::SeqCst),
            0
        );
    }

    #[tokio::test]
    async fn probe_commit_looks_up_pinned_timestamp_for_different_pin() {
        let client = FixedClient {
            latest: Some(CommitInfo::new("fff0000", date(10))),
            pinned_date: Some(date(1)),
            timestamp_calls: Default::default(),
        };

        let probe = client.probe_commit(&repo(), "abc1234").await.unwrap().unwrap();

        assert_eq!(probe.latest.id, "fff0000");
        assert_eq!(probe.pinned_date, Some(date(1)));
    }

    #[tokio::test]
    async fn probe_commit_returns_none_without_commits() {
        let client = FixedClient {
            latest: None,
            pinned_date: None,
            timestamp_calls: Default::default(),
        };

        assert_eq!(client.probe_commit(&repo(), "abc1234").await.unwrap(), None);
    }
}
