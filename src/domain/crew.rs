//! Crew declarations: agents, tasks and their structured-output bindings.
//!
//! Crews are defined in YAML and handed to the orchestrator as-is after
//! sanitization. Task descriptions are templates whose `{placeholders}` are
//! filled from the run's [`ConfigRecord`] by the orchestrator.

use std::collections::HashSet;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use super::record::ConfigRecord;
use crate::error::{CrewError, Result};
use crate::sanitize::clean;

const EVENT_PLANNING_YAML: &str = include_str!("../../crews/event_planning.yaml");

/// File names the result extractor owns; tasks may not designate them
pub const RESERVED_OUTPUT_FILES: [&str; 2] = ["venue_data.json", "event_summary.md"];

/// A complete crew definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewSpec {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Verbose orchestrator logging
    #[serde(default = "default_true")]
    pub verbose: bool,

    pub agents: Vec<AgentSpec>,

    /// Executed in declaration order
    pub tasks: Vec<TaskSpec>,
}

/// A named role executed by the orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,

    #[serde(default)]
    pub tools: Vec<Capability>,

    #[serde(default = "default_true")]
    pub verbose: bool,
}

/// Tools an agent may use inside the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Web search
    Search,
    /// Fetch and read a web page
    Scrape,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Scrape => "scrape",
        }
    }
}

/// A unit of work assigned to one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Label reported back on the task's result
    pub name: String,

    /// Role of the agent that runs this task
    pub agent: String,

    /// Template referencing input keys as `{key}`
    pub description: String,

    pub expected_output: String,

    /// Structured schema the output must validate against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<OutputSchema>,

    /// Ask the operator to confirm the output before moving on
    #[serde(default)]
    pub human_input: bool,

    /// Eligible to run concurrently with other tasks
    #[serde(default)]
    pub async_execution: bool,

    /// File the task's output is saved to, relative to the output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

/// Structured output schemas known to the crew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSchema {
    VenueDetails,
}

impl OutputSchema {
    pub fn name(&self) -> &'static str {
        match self {
            Self::VenueDetails => "venue_details",
        }
    }

    /// JSON Schema the orchestrator validates structured output against
    pub fn json_schema(&self) -> serde_json::Value {
        match self {
            Self::VenueDetails => serde_json::json!({
                "title": "VenueDetails",
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "address": { "type": "string" },
                    "capacity": { "type": "integer" },
                    "booking_status": { "type": "string" }
                },
                "required": ["name", "address", "capacity", "booking_status"],
                "additionalProperties": false
            }),
        }
    }
}

fn default_true() -> bool {
    true
}

impl CrewSpec {
    /// The built-in venue/logistics/marketing crew
    pub fn event_planning() -> Result<Self> {
        Self::from_yaml(EVENT_PLANNING_YAML)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrewError::configuration(format!(
                "Failed to read crew file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CrewError::configuration(format!("Invalid crew definition: {}", e)))
    }

    /// Validate the crew definition on its own
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CrewError::configuration("Crew name cannot be empty"));
        }
        if self.agents.is_empty() {
            return Err(CrewError::configuration("Crew must have at least one agent"));
        }
        if self.tasks.is_empty() {
            return Err(CrewError::configuration("Crew must have at least one task"));
        }

        let mut roles = HashSet::new();
        for agent in &self.agents {
            if agent.role.trim().is_empty() {
                return Err(CrewError::configuration("Agent role cannot be empty"));
            }
            if !roles.insert(agent.role.as_str()) {
                return Err(CrewError::configuration(format!(
                    "Duplicate agent role '{}'",
                    agent.role
                )));
            }
        }

        let mut names = HashSet::new();
        let mut files = HashSet::new();
        for (i, task) in self.tasks.iter().enumerate() {
            if task.name.trim().is_empty() {
                return Err(CrewError::configuration(format!("Task {} has an empty name", i)));
            }
            if !names.insert(task.name.as_str()) {
                return Err(CrewError::configuration(format!(
                    "Duplicate task name '{}'",
                    task.name
                )));
            }
            if !roles.contains(task.agent.as_str()) {
                return Err(CrewError::configuration(format!(
                    "Task '{}' references unknown agent '{}'",
                    task.name, task.agent
                )));
            }
            if let Some(ref file) = task.output_file {
                validate_output_file(&task.name, file)?;
                if !files.insert(file.as_str()) {
                    return Err(CrewError::configuration(format!(
                        "Output file '{}' is designated by more than one task",
                        file
                    )));
                }
            }
        }

        Ok(())
    }

    /// Check that every template placeholder names an input key
    pub fn validate_inputs(&self, inputs: &ConfigRecord) -> Result<()> {
        for task in &self.tasks {
            for text in [&task.description, &task.expected_output] {
                if let Some(missing) = placeholders(text).find(|key| !inputs.contains_key(key)) {
                    return Err(CrewError::configuration(format!(
                        "Task '{}' references unknown input '{{{}}}'",
                        task.name, missing
                    )));
                }
            }
        }
        Ok(())
    }

    /// Copy with every agent and task text restricted to ASCII
    pub fn sanitized(&self) -> Self {
        let mut crew = self.clone();
        for agent in &mut crew.agents {
            agent.goal = clean(&agent.goal);
            agent.backstory = clean(&agent.backstory);
        }
        for task in &mut crew.tasks {
            task.description = clean(&task.description);
            task.expected_output = clean(&task.expected_output);
        }
        crew
    }

    pub fn get_task(&self, name: &str) -> Option<&TaskSpec> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Schemas bound by at least one task, in first-use order
    pub fn schemas(&self) -> Vec<OutputSchema> {
        let mut seen = Vec::new();
        for schema in self.tasks.iter().filter_map(|t| t.output_schema) {
            if !seen.contains(&schema) {
                seen.push(schema);
            }
        }
        seen
    }
}

fn validate_output_file(task: &str, file: &str) -> Result<()> {
    let path = Path::new(file);
    let plain = !file.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if !plain {
        return Err(CrewError::configuration(format!(
            "Task '{}' output file '{}' must be a relative path inside the output directory",
            task, file
        )));
    }
    if RESERVED_OUTPUT_FILES.contains(&file) {
        return Err(CrewError::configuration(format!(
            "Task '{}' output file '{}' is reserved for extracted results",
            task, file
        )));
    }
    Ok(())
}

/// Iterate the `{key}` placeholders of a template
pub fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    template.split('{').skip(1).filter_map(|chunk| {
        let (key, _) = chunk.split_once('}')?;
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then_some(key)
    })
}

/// Fill a template's placeholders from the record; unknown keys stay as-is.
///
/// Single pass over the template: substituted values are never re-scanned.
pub fn render(template: &str, inputs: &ConfigRecord) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let value = after
            .find('}')
            .and_then(|close| inputs.get(&after[..close]).map(|value| (close, value)));
        match value {
            Some((close, value)) => {
                out.push_str(&value.to_string());
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
