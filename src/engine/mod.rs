//! Engine-side inputs of the audit
//!
//! # Modules
//!
//! - [`descriptor`]: Pin descriptor (`env.json`) loading and skip rules
//! - [`locator`]: Recovers the upstream repository from a `build.sh`
//! - [`types`]: Hosting platforms and repository coordinates
//! - [`error`]: Errors raised while reading engine files

pub mod descriptor;
pub mod error;
pub mod locator;
pub mod types;

pub use descriptor::EngineDescriptor;
pub use locator::RepoLocator;
pub use types::{Platform, RepoCoordinate};
