//! Upstream version resolution
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ RepoLocator  │────▶│PlatformClient│────▶│  Staleness   │
//! │ (coordinate) │     │ (tag/commit) │     │  (decision)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                             ▼
//!        ┌─────────┬─────────┬────────┬─────────────┐
//!        │ GitHub  │Bitbucket│ GitLab │ SourceForge │
//!        └─────────┴─────────┴────────┴─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`client`]: The [`client::PlatformClient`] capability trait
//! - [`clients`]: One implementation per hosting platform
//! - [`staleness`]: Tag and commit staleness decisions
//! - [`error`]: Errors raised while talking to a platform
//! - [`types`]: Commit data returned by platforms

pub mod client;
pub mod clients;
pub mod error;
pub mod staleness;
pub mod types;
