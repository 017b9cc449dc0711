//! Typed event parameters.
//!
//! These are the inputs the crew's task templates reference
//! (`{event_topic}`, `{event_city}`, ...).

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::record::{ConfigRecord, ConfigValue};
use crate::error::{CrewError, Result};

const SAMPLE_DETAILS_YAML: &str = include_str!("../../crews/event_details.yaml");

/// Parameters of the event being planned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventDetails {
    pub event_topic: String,
    pub event_description: String,
    pub event_city: String,
    /// ISO date, kept as text because the orchestrator only interpolates it
    pub tentative_date: String,
    pub expected_participants: i64,
    pub budget: i64,
    pub venue_type: String,
    pub duration: String,
    #[serde(default)]
    pub key_requirements: Vec<String>,
    #[serde(default)]
    pub target_audience: Vec<String>,
}

impl EventDetails {
    /// The built-in conference used when no details file is given
    pub fn sample() -> Result<Self> {
        Self::from_yaml(SAMPLE_DETAILS_YAML)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CrewError::configuration(format!("Invalid event details: {}", e)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrewError::configuration(format!(
                "Failed to read event details {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Flatten into the ordered record handed to the orchestrator
    pub fn to_record(&self) -> ConfigRecord {
        ConfigRecord::new()
            .with("event_topic", self.event_topic.as_str())
            .with("event_description", self.event_description.as_str())
            .with("event_city", self.event_city.as_str())
            .with("tentative_date", self.tentative_date.as_str())
            .with("expected_participants", self.expected_participants)
            .with("budget", self.budget)
            .with("venue_type", self.venue_type.as_str())
            .with("duration", self.duration.as_str())
            .with("key_requirements", ConfigValue::from(self.key_requirements.clone()))
            .with("target_audience", ConfigValue::from(self.target_audience.clone()))
    }
}
