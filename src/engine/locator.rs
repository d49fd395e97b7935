//! Upstream repository discovery from engine build scripts
//!
//! Build scripts clone the upstream sources, enter them and pin a version:
//!
//! ```text
//! git clone https://github.com/acme/widget.git source
//! pushd source
//! git checkout abc123
//! ```
//!
//! The `pushd source` line marks the clone; the line right before it holds
//! the clone URL. The scan only continues through `git checkout` lines after
//! the marker, so a marker followed by anything else yields nothing.

use reqwest::Url;

use crate::config::DEFAULT_SELF_HOSTED_GITLAB_HOST;
use crate::engine::types::{Platform, RepoCoordinate};

/// Line that marks entry into the cloned source tree
pub const SOURCE_SENTINEL: &str = "pushd source";

const CLONE_COMMAND: &str = "git clone ";
const CHECKOUT_COMMAND: &str = "git checkout";

/// Path segment SourceForge puts in front of the project name
const SOURCEFORGE_PROJECT_PREFIX: &str = "p";

/// Recovers a [`RepoCoordinate`] from build script text
#[derive(Debug, Clone)]
pub struct RepoLocator {
    self_hosted_gitlab_host: String,
}

impl RepoLocator {
    pub fn new(self_hosted_gitlab_host: &str) -> Self {
        Self {
            self_hosted_gitlab_host: self_hosted_gitlab_host.to_string(),
        }
    }

    /// Returns `None` when the script has no recognisable clone of a known host.
    pub fn locate(&self, script: &str) -> Option<RepoCoordinate> {
        let mut previous = "";
        let mut clone_line: Option<&str> = None;

        for line in script.split('\n') {
            if let Some(clone) = clone_line {
                if !line.contains(CHECKOUT_COMMAND) {
                    break;
                }
                if let Some(coordinate) = self.parse_clone_line(clone) {
                    return Some(coordinate);
                }
            }

            if line == SOURCE_SENTINEL {
                clone_line = Some(previous);
            }
            previous = line;
        }

        None
    }

    fn parse_clone_line(&self, line: &str) -> Option<RepoCoordinate> {
        let (_, args) = line.split_once(CLONE_COMMAND)?;
        let raw_url = args.split(' ').next()?;
        let url = Url::parse(raw_url).ok()?;
        let platform = self.platform_for_host(url.host_str()?)?;

        let segments: Vec<&str> = url
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .collect();

        let (organization, repository) = match platform {
            Platform::GitHub | Platform::Bitbucket | Platform::GitLab => {
                (*segments.first()?, segments.get(1)?.to_string())
            }
            Platform::SelfHostedGitLab => {
                let (organization, rest) = segments.split_first()?;
                (*organization, rest.join("/"))
            }
            Platform::SourceForge => {
                let segments = match segments.split_first() {
                    Some((&SOURCEFORGE_PROJECT_PREFIX, rest)) => rest,
                    _ => &segments[..],
                };
                let (organization, rest) = segments.split_first()?;
                (*organization, rest.join("/"))
            }
        };

        let repository = repository.strip_suffix(".git").unwrap_or(&repository);
        if repository.is_empty() {
            return None;
        }

        Some(RepoCoordinate::new(platform, organization, repository))
    }

    fn platform_for_host(&self, host: &str) -> Option<Platform> {
        match host {
            "github.com" => Some(Platform::GitHub),
            "bitbucket.org" => Some(Platform::Bitbucket),
            "gitlab.com" => Some(Platform::GitLab),
            "git.code.sf.net" => Some(Platform::SourceForge),
            _ if host == self.self_hosted_gitlab_host => Some(Platform::SelfHostedGitLab),
            _ => None,
        }
    }
}

impl Default for RepoLocator {
    fn default() -> Self {
        Self::new(DEFAULT_SELF_HOSTED_GITLAB_HOST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn locate_finds_github_repository() {
        let script = "git clone https://github.com/acme/widget.git\npushd source\ngit checkout abc123\n";

        assert_eq!(
            RepoLocator::default().locate(script),
            Some(RepoCoordinate::new(Platform::GitHub, "acme", "widget"))
        );
    }

    #[rstest]
    #[case(
        "https://github.com/acme/widget.git",
        RepoCoordinate::new(Platform::GitHub, "acme", "widget")
    )]
    #[case(
        "https://github.com/acme/widget",
        RepoCoordinate::new(Platform::GitHub, "acme", "widget")
    )]
    #[case(
        "https://bitbucket.org/team/engine.git",
        RepoCoordinate::new(Platform::Bitbucket, "team", "engine")
    )]
    #[case(
        "https://gitlab.com/group/project.git",
        RepoCoordinate::new(Platform::GitLab, "group", "project")
    )]
    #[case(
        "https://gitlab.com/group/subgroup/project.git",
        RepoCoordinate::new(Platform::GitLab, "group", "subgroup")
    )]
    #[case(
        "https://git.libretro.com/group/subgroup/project.git",
        RepoCoordinate::new(Platform::SelfHostedGitLab, "group", "subgroup/project")
    )]
    #[case(
        "https://git.libretro.com/libretro/core.git",
        RepoCoordinate::new(Platform::SelfHostedGitLab, "libretro", "core")
    )]
    #[case(
        "https://git.code.sf.net/p/scummvm/code",
        RepoCoordinate::new(Platform::SourceForge, "scummvm", "code")
    )]
    #[case(
        "https://git.code.sf.net/p/project/repo/sub.git",
        RepoCoordinate::new(Platform::SourceForge, "project", "repo/sub")
    )]
    fn locate_maps_clone_url_to_coordinate(
        #[case] url: &str,
        #[case] expected: RepoCoordinate,
    ) {
        let script = format!("#!/bin/bash\ngit clone {url} source\npushd source\ngit checkout v1.0\npopd\n");

        assert_eq!(RepoLocator::default().locate(&script), Some(expected));
    }

    #[rstest]
    #[case::no_sentinel("git clone https://github.com/acme/widget.git\ncd source\ngit checkout abc\n")]
    #[case::no_checkout_after_sentinel("git clone https://github.com/acme/widget.git\npushd source\nmake\n")]
    #[case::sentinel_at_end("git clone https://github.com/acme/widget.git\npushd source")]
    #[case::sentinel_on_first_line("pushd source\ngit checkout abc\n")]
    #[case::unknown_host("git clone https://example.com/acme/widget.git\npushd source\ngit checkout abc\n")]
    #[case::clone_not_before_sentinel("git clone https://github.com/acme/widget.git\necho hi\npushd source\ngit checkout abc\n")]
    #[case::indented_sentinel("git clone https://github.com/acme/widget.git\n  pushd source\ngit checkout abc\n")]
    #[case::missing_repository("git clone https://github.com/acme\npushd source\ngit checkout abc\n")]
    #[case::flag_before_url("git clone --depth 1 https://github.com/acme/widget.git\npushd source\ngit checkout abc\n")]
    fn locate_returns_none(#[case] script: &str) {
        assert_eq!(RepoLocator::default().locate(script), None);
    }

    #[test]
    fn locate_uses_configured_self_hosted_host() {
        let script = "git clone https://gitlab.example.org/team/tool.git\npushd source\ngit checkout abc\n";

        assert_eq!(
            RepoLocator::new("gitlab.example.org").locate(script),
            Some(RepoCoordinate::new(Platform::SelfHostedGitLab, "team", "tool"))
        );
        assert_eq!(RepoLocator::default().locate(script), None);
    }

    #[test]
    fn locate_ignores_clones_after_the_first_sentinel() {
        let script = "git clone https://github.com/first/one.git\npushd source\ngit checkout a\npopd\ngit clone https://github.com/second/two.git\npushd source\ngit checkout b\n";

        assert_eq!(
            RepoLocator::default().locate(script),
            Some(RepoCoordinate::new(Platform::GitHub, "first", "one"))
        );
    }
}
