use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::Context;

// =============================================================================
// Audit constants
// =============================================================================

/// Minimum age gap before a newer upstream commit is reported (7 days)
pub const STALENESS_WINDOW_DAYS: i64 = 7;

/// Width of the hash prefixes written into reported issues
pub const HASH_PREFIX_LEN: usize = 7;

/// Depth of the scratch clone used for platforms without a commit API
pub const DEFAULT_CLONE_DEPTH: u32 = 100;

/// Number of engines checked at the same time
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Directory holding one sub-directory per engine
pub const DEFAULT_ENGINES_DIR: &str = "engines";

/// GitLab-compatible host that is treated as a self-hosted instance
pub const DEFAULT_SELF_HOSTED_GITLAB_HOST: &str = "git.libretro.com";

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const BITBUCKET_API_URL: &str = "https://api.bitbucket.org/2.0";
pub const GITLAB_API_URL: &str = "https://gitlab.com/api/v4";
pub const SOURCEFORGE_GIT_URL: &str = "https://git.code.sf.net/p";

/// Audit configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditConfig {
    pub engines_dir: PathBuf,
    /// Token forwarded to the GitHub API
    pub token: Option<String>,
    pub concurrency: usize,
    pub self_hosted_gitlab_host: String,
    /// Parent directory for scratch clones (system temp dir when unset)
    pub scratch_dir: Option<PathBuf>,
    pub clone_depth: u32,
    pub endpoints: EndpointsConfig,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            engines_dir: PathBuf::from(DEFAULT_ENGINES_DIR),
            token: None,
            concurrency: DEFAULT_CONCURRENCY,
            self_hosted_gitlab_host: DEFAULT_SELF_HOSTED_GITLAB_HOST.to_string(),
            scratch_dir: None,
            clone_depth: DEFAULT_CLONE_DEPTH,
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Reads a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Base URL of the self-hosted GitLab API.
    pub fn self_hosted_gitlab_url(&self) -> String {
        self.endpoints
            .self_hosted_gitlab
            .clone()
            .unwrap_or_else(|| format!("https://{}/api/v4", self.self_hosted_gitlab_host))
    }
}

/// Base URLs of the hosting platforms
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointsConfig {
    pub github: String,
    pub bitbucket: String,
    pub gitlab: String,
    /// Derived from `selfHostedGitlabHost` when unset
    pub self_hosted_gitlab: Option<String>,
    /// Prefix that `<project>/<repo>` is appended to for cloning
    pub sourceforge: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            github: GITHUB_API_URL.to_string(),
            bitbucket: BITBUCKET_API_URL.to_string(),
            gitlab: GITLAB_API_URL.to_string(),
            self_hosted_gitlab: None,
            sourceforge: SOURCEFORGE_GIT_URL.to_string(),
        }
    }
}
