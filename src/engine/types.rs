//! Hosting platforms and repository coordinates

use std::fmt;

/// Hosting platform of an upstream repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// github.com
    GitHub,
    /// bitbucket.org
    Bitbucket,
    /// gitlab.com
    GitLab,
    /// A GitLab-compatible instance on another host
    SelfHostedGitLab,
    /// SourceForge git hosting (git.code.sf.net)
    SourceForge,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::GitHub,
        Platform::Bitbucket,
        Platform::GitLab,
        Platform::SelfHostedGitLab,
        Platform::SourceForge,
    ];

    /// Returns the string representation of the platform
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::GitHub => "github",
            Platform::Bitbucket => "bitbucket",
            Platform::GitLab => "gitlab",
            Platform::SelfHostedGitLab => "gitlab-self-hosted",
            Platform::SourceForge => "sourceforge",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an engine's upstream sources live
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoCoordinate {
    pub platform: Platform,
    /// Owner, workspace, group or SourceForge project
    pub organization: String,
    /// Repository name; may contain `/` for nested GitLab groups
    pub repository: String,
}

impl RepoCoordinate {
    pub fn new(platform: Platform, organization: &str, repository: &str) -> Self {
        Self {
            platform,
            organization: organization.to_string(),
            repository: repository.to_string(),
        }
    }

    /// `organization/repository`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.organization, self.repository)
    }
}

impl fmt::Display for RepoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} on {}", self.organization, self.repository, self.platform)
    }
}
