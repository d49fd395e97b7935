//! Staleness decisions for pinned tags and commits
//!
//! Both decisions are pure: all upstream data is fetched beforehand.

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::STALENESS_WINDOW_DAYS;
use crate::version::types::CommitInfo;

/// Tags that move over time and never describe a fixed release
pub const FLOATING_TAGS: [&str; 2] = ["latest", "nightly"];

/// Outcome of comparing a pinned commit against upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    /// The pin is (a prefix of) the newest commit
    UpToDate,
    /// The newest commit is at least a full staleness window newer
    Stale,
    /// The newest commit differs but is too recent to report
    WithinWindow,
    /// The pinned commit's date is unknown; the axis is skipped
    Undetermined,
}

/// Whether `latest_tag` should be reported as a replacement for `current_tag`
pub fn is_tag_stale(latest_tag: &str, current_tag: &str) -> bool {
    latest_tag != current_tag && !is_floating_tag(latest_tag)
}

fn is_floating_tag(tag: &str) -> bool {
    FLOATING_TAGS
        .iter()
        .any(|floating| floating.eq_ignore_ascii_case(tag))
}

/// Whether two commit ids name the same commit, allowing either to be abbreviated
pub fn hashes_match(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let a = a.to_ascii_lowercase();
    let b = b.to_ascii_lowercase();
    a.starts_with(&b) || b.starts_with(&a)
}

/// Whether `latest_date` is at least one staleness window after `current_date`
pub fn is_commit_stale(current_date: DateTime<Utc>, latest_date: DateTime<Utc>) -> bool {
    latest_date >= current_date + TimeDelta::days(STALENESS_WINDOW_DAYS)
}

pub fn evaluate_commit(
    current_hash: &str,
    current_date: Option<DateTime<Utc>>,
    latest: &CommitInfo,
) -> CommitStatus {
    if hashes_match(current_hash, &latest.id) {
        return CommitStatus::UpToDate;
    }

    let Some(current_date) = current_date else {
        return CommitStatus::Undetermined;
    };

    if is_commit_stale(current_date, latest.date) {
        CommitStatus::Stale
    } else {
        CommitStatus::WithinWindow
    }
}
