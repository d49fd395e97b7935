//! Staleness audit for pinned engine builds
//!
//! Each engine directory carries a `build.sh` that clones an upstream
//! repository and an `env.json` that pins a tag and/or commit. The audit
//! resolves the upstream repository, asks its hosting platform for the newest
//! tag and commit, and reports the pins that have fallen behind.

pub mod audit;
pub mod config;
pub mod engine;
pub mod version;
