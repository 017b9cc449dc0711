//! Domain types for eventcrew.
//!
//! This module contains the core data structures:
//! - Crew: Agent and task declarations
//! - Event: Typed event parameters
//! - Record: Ordered template inputs handed to the orchestrator
//! - Result: Task and run results reported back
//! - Artifact: Files persisted by a run

pub mod artifact;
pub mod crew;
pub mod event;
pub mod record;
pub mod result;

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactType};
pub use crew::{AgentSpec, Capability, CrewSpec, OutputSchema, TaskSpec};
pub use event::EventDetails;
pub use record::{ConfigRecord, ConfigValue};
pub use result::{RunResult, TaskResult, VenueDetails};
