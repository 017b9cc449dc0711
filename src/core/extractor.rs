//! Classification and persistence of task results.
//!
//! Each result is handled on its own: a structured payload is written as a
//! canonical JSON document, free text is echoed verbatim. Once every result
//! is handled the run summary is written. The first failure aborts the pass
//! and leaves already-written artifacts in place.

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::domain::{Artifact, ArtifactType, RunResult, TaskResult, VenueDetails};
use crate::error::{CrewError, Result};

use super::artifact_store::ArtifactStore;

/// Canonical JSON document for the structured venue details
pub const VENUE_DATA_FILE: &str = "venue_data.json";

/// Textual representation of the whole run
pub const SUMMARY_FILE: &str = "event_summary.md";

/// What happened to one task result
#[derive(Debug, Clone)]
pub enum Extracted {
    /// Schema-validated payload persisted as JSON
    Structured {
        task: String,
        venue: VenueDetails,
        artifact: Artifact,
    },

    /// Free text surfaced unchanged
    FreeText { task: String, text: String },
}

impl Extracted {
    pub fn task(&self) -> &str {
        match self {
            Self::Structured { task, .. } | Self::FreeText { task, .. } => task,
        }
    }
}

/// Outcome of a complete extraction pass
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub extracted: Vec<Extracted>,
    pub summary: Artifact,
}

impl ExtractionReport {
    /// All artifacts written by the pass, summary last
    pub fn artifacts(&self) -> Vec<&Artifact> {
        self.extracted
            .iter()
            .filter_map(|e| match e {
                Extracted::Structured { artifact, .. } => Some(artifact),
                Extracted::FreeText { .. } => None,
            })
            .chain(std::iter::once(&self.summary))
            .collect()
    }
}

/// Walks a run result and persists it
pub struct ResultExtractor {
    store: ArtifactStore,
}

impl ResultExtractor {
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    /// Process every task result, then write the summary.
    ///
    /// The human-readable echo goes to `echo`.
    #[instrument(skip_all, fields(tasks = run.tasks.len()))]
    pub async fn extract(
        &self,
        run: &RunResult,
        echo: &mut (dyn Write + Send),
    ) -> Result<ExtractionReport> {
        emit(echo, format_args!("Crew final output:\n{}\n", run))?;

        let mut extracted = Vec::with_capacity(run.tasks.len());
        for result in &run.tasks {
            extracted.push(self.extract_one(result, echo).await?);
        }

        let summary = self
            .store
            .write(SUMMARY_FILE, &run.to_string(), ArtifactType::Summary, None)
            .await?;
        info!(path = %summary.path.display(), "Event summary saved");
        emit(echo, format_args!("Event summary saved to {}", summary.path.display()))?;

        Ok(ExtractionReport { extracted, summary })
    }

    async fn extract_one(
        &self,
        result: &TaskResult,
        echo: &mut (dyn Write + Send),
    ) -> Result<Extracted> {
        result.validate()?;
        emit(echo, format_args!("\nOutput from task: {}", result.name))?;

        if let Some(venue) = &result.structured {
            let json = serde_json::to_string_pretty(venue)
                .map_err(|e| CrewError::orchestration(anyhow::Error::new(e)))?;
            emit(echo, format_args!("Parsed venue details:\n{}", json))?;

            let artifact = self
                .store
                .write(
                    VENUE_DATA_FILE,
                    &json,
                    ArtifactType::StructuredOutput,
                    Some(&result.name),
                )
                .await?;
            debug!(task = %result.name, "Structured output persisted");

            return Ok(Extracted::Structured {
                task: result.name.clone(),
                venue: venue.clone(),
                artifact,
            });
        }

        let text = result.raw.clone().unwrap_or_default();
        emit(echo, format_args!("{}", text))?;
        Ok(Extracted::FreeText {
            task: result.name.clone(),
            text,
        })
    }
}

fn emit(echo: &mut (dyn Write + Send), args: std::fmt::Arguments<'_>) -> Result<()> {
    writeln!(echo, "{}", args).map_err(|e| CrewError::persistence(PathBuf::from("-"), e))
}
