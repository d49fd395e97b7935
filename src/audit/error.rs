use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to list engines in {path}: {source}")]
    EnumerateEngines {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
