//! Transient answers from hosting platforms

use chrono::{DateTime, Utc};

/// A commit id together with its committer timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: String,
    pub date: DateTime<Utc>,
}

impl CommitInfo {
    pub fn new(id: &str, date: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            date,
        }
    }
}

/// Commit-axis answer for one engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitProbe {
    /// Newest commit on the default branch
    pub latest: CommitInfo,
    /// Timestamp of the pinned commit; `None` when it was not looked up
    /// (pin matches `latest`) or could not be resolved upstream
    pub pinned_date: Option<DateTime<Utc>>,
}
