//! Run results reported back by the orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CrewError, Result};

/// Structured details of the booked venue
///
/// Field order is the canonical key order of the persisted JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenueDetails {
    pub name: String,
    pub address: String,
    pub capacity: i64,
    pub booking_status: String,
}

/// Output of a single task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Task name from the crew definition
    pub name: String,

    /// Role of the agent that produced the output
    #[serde(default)]
    pub agent: String,

    /// Schema-validated payload, when the task binds a schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<VenueDetails>,

    /// Free-text payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl TaskResult {
    pub fn structured(name: impl Into<String>, venue: VenueDetails) -> Self {
        Self {
            name: name.into(),
            agent: String::new(),
            structured: Some(venue),
            raw: None,
        }
    }

    pub fn text(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent: String::new(),
            structured: None,
            raw: Some(raw.into()),
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Reject a result that carries neither payload
    pub fn validate(&self) -> Result<()> {
        if self.structured.is_none() && self.raw.is_none() {
            return Err(CrewError::orchestration(anyhow::anyhow!(
                "Task '{}' produced no output",
                self.name
            )));
        }
        Ok(())
    }

    /// Text written to the task's designated output file
    pub fn file_content(&self) -> Result<String> {
        match (&self.raw, &self.structured) {
            (Some(raw), _) => Ok(raw.clone()),
            (None, Some(venue)) => serde_json::to_string_pretty(venue)
                .map_err(|e| CrewError::orchestration(anyhow::Error::new(e))),
            (None, None) => {
                self.validate()?;
                Ok(String::new())
            }
        }
    }
}

/// Everything the orchestrator returns for one kickoff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Combined final output of the run
    pub raw: String,

    /// Per-task results in execution order
    #[serde(default)]
    pub tasks: Vec<TaskResult>,
}

impl RunResult {
    pub fn new(raw: impl Into<String>, tasks: Vec<TaskResult>) -> Self {
        Self {
            raw: raw.into(),
            tasks,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let run: Self = serde_json::from_str(content).map_err(|e| {
            CrewError::orchestration(anyhow::Error::new(e).context("Malformed run result"))
        })?;
        run.validate()?;
        Ok(run)
    }

    pub fn validate(&self) -> Result<()> {
        self.tasks.iter().try_for_each(TaskResult::validate)
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
