//! One audit pass over all engines
//!
//! For every engine: load its pin descriptor, locate the upstream repository
//! in its build script, ask the matching platform client for the newest tag
//! and commit, and turn stale pins into [`Issue`]s. Failures are contained per
//! engine and per axis; they are logged and produce no issue.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::audit::error::AuditError;
use crate::audit::issue::Issue;
use crate::config::AuditConfig;
use crate::engine::descriptor::{BUILD_SCRIPT_FILE, DESCRIPTOR_FILE, EngineDescriptor};
use crate::engine::locator::RepoLocator;
use crate::engine::types::RepoCoordinate;
use crate::version::client::PlatformClient;
use crate::version::clients::{PlatformClients, create_default_clients};
use crate::version::staleness::{CommitStatus, evaluate_commit, is_tag_stale};

/// Runs the staleness audit over an engines directory
pub struct AuditRunner {
    engines_dir: PathBuf,
    locator: RepoLocator,
    clients: PlatformClients,
    concurrency: usize,
}

impl AuditRunner {
    /// Create a runner talking to the real hosting platforms
    pub fn new(config: &AuditConfig) -> Self {
        Self::with_clients(
            &config.engines_dir,
            RepoLocator::new(&config.self_hosted_gitlab_host),
            create_default_clients(config),
            config.concurrency,
        )
    }

    /// Create a runner with explicit platform clients
    pub fn with_clients(
        engines_dir: &Path,
        locator: RepoLocator,
        clients: PlatformClients,
        concurrency: usize,
    ) -> Self {
        Self {
            engines_dir: engines_dir.to_path_buf(),
            locator,
            clients,
            concurrency: concurrency.max(1),
        }
    }

    /// Lists engine directory names, sorted
    pub async fn discover_engines(&self) -> Result<Vec<String>, AuditError> {
        let enumerate_error = |source| AuditError::EnumerateEngines {
            path: self.engines_dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.engines_dir)
            .await
            .map_err(enumerate_error)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(enumerate_error)? {
            // Follows symlinks, so linked engine directories count
            let is_dir = tokio::fs::metadata(entry.path())
                .await
                .is_ok_and(|metadata| metadata.is_dir());
            if !is_dir {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Discovers the engines and audits all of them
    pub async fn run(&self) -> Result<Vec<Issue>, AuditError> {
        let engines = self.discover_engines().await?;
        info!("Auditing {} engines", engines.len());
        Ok(self.audit(engines).await)
    }

    /// Audits the given engines; issues keep the order of `engines`
    pub async fn audit(&self, engines: Vec<String>) -> Vec<Issue> {
        stream::iter(engines)
            .map(|name| async move {
                let span = info_span!("engine", name = %name);
                self.check_engine(&name).instrument(span).await
            })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Checks one engine, returning its issues (at most one per axis)
    pub async fn check_engine(&self, name: &str) -> Vec<Issue> {
        let engine_dir = self.engines_dir.join(name);

        let descriptor = match EngineDescriptor::load(&engine_dir) {
            Ok(Some(descriptor)) => descriptor,
            Ok(None) => {
                debug!("No {}, skipping", DESCRIPTOR_FILE);
                return Vec::new();
            }
            Err(e) => {
                warn!("Skipping engine: {}", e);
                return Vec::new();
            }
        };

        if descriptor.is_skipped() {
            debug!("Nothing to check (frozen or unpinned)");
            return Vec::new();
        }

        let script_path = engine_dir.join(BUILD_SCRIPT_FILE);
        let script = match tokio::fs::read_to_string(&script_path).await {
            Ok(script) => script,
            Err(e) => {
                warn!("Skipping engine: failed to read {}: {}", script_path.display(), e);
                return Vec::new();
            }
        };

        let Some(coordinate) = self.locator.locate(&script) else {
            warn!("No upstream repository found in {}, skipping", BUILD_SCRIPT_FILE);
            return Vec::new();
        };

        let Some(client) = self.clients.get(&coordinate.platform) else {
            warn!("No client configured for {}, skipping", coordinate.platform);
            return Vec::new();
        };

        info!("checking {}", coordinate);

        let mut issues = Vec::new();
        if let Some(current_tag) = descriptor.tag_pin() {
            issues.extend(check_tag(name, client, &coordinate, current_tag).await);
        }
        if let Some(current_hash) = descriptor.hash_pin() {
            issues.extend(check_commit(name, client, &coordinate, current_hash).await);
        }
        issues
    }
}

async fn check_tag(
    name: &str,
    client: &Arc<dyn PlatformClient>,
    coordinate: &RepoCoordinate,
    current_tag: &str,
) -> Option<Issue> {
    let latest_tag = match client.latest_tag(coordinate).await {
        Ok(Some(tag)) => tag,
        Ok(None) => {
            debug!("No tags found for {}", coordinate);
            return None;
        }
        Err(e) => {
            warn!("Failed to fetch latest tag for {}: {}", coordinate, e);
            return None;
        }
    };

    if !is_tag_stale(&latest_tag, current_tag) {
        debug!("Tag {} is current (latest {})", current_tag, latest_tag);
        return None;
    }

    info!("New tag {} (pinned {})", latest_tag, current_tag);
    Some(Issue::tag(name, &latest_tag, current_tag))
}

async fn check_commit(
    name: &str,
    client: &Arc<dyn PlatformClient>,
    coordinate: &RepoCoordinate,
    current_hash: &str,
) -> Option<Issue> {
    let probe = match client.probe_commit(coordinate, current_hash).await {
        Ok(Some(probe)) => probe,
        Ok(None) => {
            debug!("No commits found for {}", coordinate);
            return None;
        }
        Err(e) => {
            warn!("Failed to fetch latest commit for {}: {}", coordinate, e);
            return None;
        }
    };

    match evaluate_commit(current_hash, probe.pinned_date, &probe.latest) {
        CommitStatus::Stale => {
            info!("New commit {} (pinned {})", probe.latest.id, current_hash);
            Some(Issue::commit(name, &probe.latest.id, current_hash))
        }
        CommitStatus::UpToDate => {
            debug!("Commit {} is current", current_hash);
            None
        }
        CommitStatus::WithinWindow => {
            debug!(
                "Commit {} is behind {} but within the staleness window",
                current_hash, probe.latest.id
            );
            None
        }
        CommitStatus::Undetermined => {
            warn!(
                "Pinned commit {} not found on {}, skipping commit check",
                current_hash, coordinate
            );
            None
        }
    }
}
