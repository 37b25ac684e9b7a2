use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a run, or a single repository's scan
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to compile regex {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    #[error("Failed to read directory {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("{repository}: {source:#}")]
    History {
        repository: String,
        source: anyhow::Error,
    },

    #[error("Scan task for {repository} exited without reporting a result")]
    TaskLost { repository: String },

    #[error("Failed to start worker pool: {source}")]
    WorkerPool {
        source: rayon::ThreadPoolBuildError,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ScanError {
    /// Name of the repository the error belongs to, if it is repository-scoped
    pub fn repository(&self) -> Option<&str> {
        match self {
            ScanError::History { repository, .. } | ScanError::TaskLost { repository } => {
                Some(repository)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
