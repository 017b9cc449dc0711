//! Drives a single crew run.
//!
//! Sanitizes the crew and its inputs, hands them to the orchestrator, saves
//! each designated task output, then runs the result extractor. Any failure
//! aborts the run with a classified [`CrewError`]; files already written
//! stay on disk and nothing is retried.

use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::adapters::{KickoffRequest, Orchestrator};
use crate::config::Credentials;
use crate::domain::{Artifact, ArtifactType, ConfigRecord, CrewSpec, RunResult};
use crate::error::{CrewError, Result};
use crate::sanitize::sanitize_record;

use super::artifact_store::ArtifactStore;
use super::extractor::{Extracted, ResultExtractor};

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub crew_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Every file written, in write order
    pub artifacts: Vec<Artifact>,
    pub extracted: Vec<Extracted>,
}

/// Runs crews against an orchestrator
pub struct CrewRunner {
    orchestrator: Box<dyn Orchestrator>,
    store: ArtifactStore,
    model: String,
    timeout: Duration,
}

impl CrewRunner {
    pub fn new(orchestrator: Box<dyn Orchestrator>, store: ArtifactStore) -> Self {
        Self {
            orchestrator,
            store,
            model: crate::config::DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(1800),
        }
    }

    /// Resolve credentials through `lookup`, then connect the orchestrator.
    ///
    /// A missing credential is a configuration error and `build` is never
    /// called, so no orchestrator exists to kick off.
    pub fn connect<L, B>(lookup: L, build: B, store: ArtifactStore) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
        B: FnOnce(Credentials) -> Result<Box<dyn Orchestrator>>,
    {
        let credentials = Credentials::from_lookup(lookup)?;
        let model = credentials.model_name.clone();
        let orchestrator = build(credentials)?;
        Ok(Self::new(orchestrator, store).with_model(model))
    }

    pub fn orchestrator_name(&self) -> &str {
        self.orchestrator.name()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sanitize and validate a crew and its inputs without running anything
    pub fn prepare(crew: &CrewSpec, inputs: ConfigRecord) -> Result<(CrewSpec, ConfigRecord)> {
        let crew = crew.sanitized();
        let inputs = sanitize_record(inputs);
        crew.validate()?;
        crew.validate_inputs(&inputs)?;
        Ok((crew, inputs))
    }

    /// Execute a crew end to end
    #[instrument(skip_all, fields(crew = %crew.name, orchestrator = self.orchestrator.name()))]
    pub async fn run(
        &self,
        crew: &CrewSpec,
        inputs: ConfigRecord,
        echo: &mut (dyn Write + Send),
    ) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        info!(%run_id, "Starting crew run");

        let result = self.execute(run_id, crew, inputs, echo).await;
        if let Err(ref e) = result {
            error!(%run_id, error = %e, "Crew run failed");
        }
        result
    }

    async fn execute(
        &self,
        run_id: Uuid,
        crew: &CrewSpec,
        inputs: ConfigRecord,
        echo: &mut (dyn Write + Send),
    ) -> Result<RunReport> {
        let started_at = Utc::now();

        let (crew, inputs) = Self::prepare(crew, inputs)?;
        let request = KickoffRequest::new(&crew, inputs, self.model.clone());
        let run = self.kickoff(&request).await?;

        let mut artifacts = self.save_designated_outputs(&crew, &run).await?;

        let extractor = ResultExtractor::new(self.store.clone());
        let report = extractor.extract(&run, echo).await?;
        artifacts.extend(report.artifacts().into_iter().cloned());

        let completed_at = Utc::now();
        info!(
            %run_id,
            artifacts = artifacts.len(),
            elapsed_ms = (completed_at - started_at).num_milliseconds(),
            "Crew run completed"
        );

        Ok(RunReport {
            run_id,
            crew_name: crew.name.clone(),
            started_at,
            completed_at,
            artifacts,
            extracted: report.extracted,
        })
    }

    /// Call the orchestrator and check the shape of its reply
    async fn kickoff(&self, request: &KickoffRequest) -> Result<RunResult> {
        info!(tasks = request.tasks.len(), model = %request.model, "Kicking off crew");

        let run = self
            .orchestrator
            .kickoff(request, self.timeout)
            .await
            .map_err(CrewError::orchestration)?;
        run.validate()?;

        info!(results = run.tasks.len(), "Orchestrator finished");
        Ok(run)
    }

    /// Write each task's output to the file its declaration designates
    async fn save_designated_outputs(
        &self,
        crew: &CrewSpec,
        run: &RunResult,
    ) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::new();

        for result in &run.tasks {
            let Some(file) = crew
                .get_task(&result.name)
                .and_then(|task| task.output_file.as_deref())
            else {
                continue;
            };

            let artifact = self
                .store
                .write(
                    file,
                    &result.file_content()?,
                    ArtifactType::TaskOutput,
                    Some(&result.name),
                )
                .await?;
            artifacts.push(artifact);
        }

        Ok(artifacts)
    }
}
