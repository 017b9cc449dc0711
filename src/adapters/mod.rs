//! Adapter interfaces for the external orchestrator.
//!
//! Agent reasoning, tool use and task sequencing all happen on the other
//! side of this boundary. Adapters only ship a [`KickoffRequest`] across and
//! bring a [`RunResult`] back.

pub mod command;
pub mod http;

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{Credentials, OrchestratorMode, OrchestratorSettings};
use crate::domain::{AgentSpec, ConfigRecord, CrewSpec, RunResult, TaskSpec};
use crate::error::CrewError;

pub use command::CommandOrchestrator;
pub use http::HttpOrchestrator;

/// Everything the orchestrator needs for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KickoffRequest {
    /// Crew name (for the orchestrator's logs)
    pub crew: String,

    /// Model identifier the agents run on
    pub model: String,

    pub verbose: bool,

    pub agents: Vec<AgentSpec>,

    /// Ordered task declarations
    pub tasks: Vec<TaskSpec>,

    /// JSON Schemas for every schema name a task binds
    pub schemas: BTreeMap<String, serde_json::Value>,

    /// Values for the task templates
    pub inputs: ConfigRecord,
}

impl KickoffRequest {
    pub fn new(crew: &CrewSpec, inputs: ConfigRecord, model: impl Into<String>) -> Self {
        let schemas = crew
            .schemas()
            .into_iter()
            .map(|schema| (schema.name().to_string(), schema.json_schema()))
            .collect();

        Self {
            crew: crew.name.clone(),
            model: model.into(),
            verbose: crew.verbose,
            agents: crew.agents.clone(),
            tasks: crew.tasks.clone(),
            schemas,
            inputs,
        }
    }
}

/// Trait for external orchestrators
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Run the crew to completion and return its result
    async fn kickoff(&self, request: &KickoffRequest, timeout: Duration) -> Result<RunResult>;

    /// Check the orchestrator is reachable
    async fn health_check(&self) -> Result<()>;
}

/// Build the adapter selected by the configuration
pub fn build_orchestrator(
    settings: &OrchestratorSettings,
    credentials: Credentials,
) -> Result<Box<dyn Orchestrator>, CrewError> {
    match settings.mode {
        OrchestratorMode::Command => Ok(Box::new(
            CommandOrchestrator::new(settings.command.clone(), credentials)
                .with_args(settings.args.clone()),
        )),
        OrchestratorMode::Http => {
            let endpoint = settings.endpoint.as_deref().ok_or_else(|| {
                CrewError::configuration(
                    "HTTP orchestrator mode requires an endpoint (EVENTCREW_ORCHESTRATOR_URL)",
                )
            })?;
            Ok(Box::new(HttpOrchestrator::new(endpoint, credentials)))
        }
    }
}
