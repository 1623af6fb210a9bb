use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("persistence error ({op} {}): {source}", .path.display())]
    Persistence {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Task(String),
}

impl ServiceError {
    pub fn persistence(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence { op, path: path.into(), source }
    }

    /// Whether the caller supplied bad input (as opposed to an internal fault).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
