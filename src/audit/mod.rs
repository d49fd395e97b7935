//! Audit orchestration
//!
//! # Modules
//!
//! - [`runner`]: Walks the engines and collects issues
//! - [`issue`]: Reported issues and the output matrix
//! - [`error`]: Errors that abort a whole audit run

pub mod error;
pub mod issue;
pub mod runner;

pub use error::AuditError;
pub use issue::{Issue, Matrix};
pub use runner::AuditRunner;
