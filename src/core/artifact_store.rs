//! File-based artifact persistence.
//!
//! All artifacts of a run land in one output directory. Every write replaces
//! the whole file; there is no append mode and no locking between runs.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::domain::{Artifact, ArtifactType};
use crate::error::{CrewError, Result};

/// Writes run artifacts into an output directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    output_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Get the output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Absolute-or-relative path of a named artifact
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Write (or overwrite) an artifact
    pub async fn write(
        &self,
        file_name: &str,
        content: &str,
        artifact_type: ArtifactType,
        task_name: Option<&str>,
    ) -> Result<Artifact> {
        let path = self.path_for(file_name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| CrewError::persistence(parent, e))?;
        }

        fs::write(&path, content)
            .await
            .map_err(|e| CrewError::persistence(&path, e))?;

        debug!(path = %path.display(), bytes = content.len(), "Artifact written");

        Ok(Artifact::new(
            path,
            artifact_type,
            task_name.map(str::to_string),
            content.len() as u64,
        ))
    }

    /// Load an artifact from disk
    pub async fn read(&self, file_name: &str) -> Result<Option<String>> {
        let path = self.path_for(file_name);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| CrewError::persistence(&path, e))?;

        Ok(Some(content))
    }
}
