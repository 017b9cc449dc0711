//! Artifacts persisted by a crew run.
//!
//! Artifacts are whole files, overwritten on every run.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file written during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Where the file was written
    pub path: PathBuf,

    /// Type of artifact
    pub artifact_type: ArtifactType,

    /// Task that produced this artifact (None for the run summary)
    pub task_name: Option<String>,

    /// When the artifact was written
    pub created_at: DateTime<Utc>,

    /// Size in bytes (for tracking)
    pub size_bytes: u64,
}

impl Artifact {
    /// Create a new artifact record
    pub fn new(
        path: PathBuf,
        artifact_type: ArtifactType,
        task_name: Option<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            path,
            artifact_type,
            task_name,
            created_at: Utc::now(),
            size_bytes,
        }
    }

    /// File name component of the path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Types of artifacts a run can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    /// Schema-validated task output serialized as JSON
    StructuredOutput,

    /// A task's output saved to its designated file
    TaskOutput,

    /// Combined output of the whole run
    Summary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_creation() {
        let artifact = Artifact::new(
            PathBuf::from("out/venue_data.json"),
            ArtifactType::StructuredOutput,
            Some("venue".to_string()),
            97,
        );

        assert_eq!(artifact.file_name(), "venue_data.json");
        assert_eq!(artifact.artifact_type, ArtifactType::StructuredOutput);
        assert_eq!(artifact.size_bytes, 97);
    }

    #[test]
    fn test_artifact_serialization() {
        let artifact = Artifact::new(
            PathBuf::from("event_summary.md"),
            ArtifactType::Summary,
            None,
            12,
        );

        let json = serde_json::to_string(&artifact).unwrap();
        assert!(json.contains("\"artifact_type\":\"summary\""));

        let parsed: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.path, PathBuf::from("event_summary.md"));
        assert!(parsed.task_name.is_none());
    }
}
