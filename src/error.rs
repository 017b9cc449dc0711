//! Classified errors for a crew run.
//!
//! Every failure a run can hit falls into one of three kinds. Configuration
//! errors are raised before the orchestrator is contacted; orchestration and
//! persistence errors abort the run at the point they occur.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised while preparing, running or persisting a crew run
#[derive(Debug, Error)]
pub enum CrewError {
    /// Missing credential or invalid crew/details declaration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure surfaced by the external orchestrator
    #[error("Orchestration failed: {0:#}")]
    Orchestration(anyhow::Error),

    /// Filesystem failure while writing an artifact
    #[error("Failed to write artifact {}: {cause}", path.display())]
    Persistence { path: PathBuf, cause: std::io::Error },
}

/// Kind of a [`CrewError`], for callers that branch on the class only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Orchestration,
    Persistence,
}

impl CrewError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn orchestration(error: impl Into<anyhow::Error>) -> Self {
        Self::Orchestration(error.into())
    }

    pub fn persistence(path: impl Into<PathBuf>, cause: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            cause,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Orchestration(_) => ErrorKind::Orchestration,
            Self::Persistence { .. } => ErrorKind::Persistence,
        }
    }
}

pub type Result<T, E = CrewError> = std::result::Result<T, E>;
