//! eventcrew - Event-planning crew runner
//!
//! Declares a crew of agents (venue coordination, logistics, marketing) and
//! their tasks, hands them to an external multi-agent orchestrator, and
//! persists what comes back.
//!
//! # Architecture
//!
//! The orchestrator is opaque. This crate owns what happens on either side
//! of it:
//! - Before: every outbound string is restricted to ASCII
//! - After: structured results are written as canonical JSON, free text is
//!   surfaced verbatim, and the run summary is saved
//!
//! # Modules
//!
//! - `adapters`: Orchestrator boundary (subprocess and HTTP)
//! - `core`: Runner, result extractor, artifact store
//! - `domain`: Data structures (Crew, EventDetails, ConfigRecord, RunResult)
//! - `sanitize`: ASCII sanitization
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the built-in event-planning crew
//! eventcrew run
//!
//! # Preview the rendered tasks without calling the orchestrator
//! eventcrew plan --details event.yaml
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod sanitize;

// Re-export main types at crate root for convenience
pub use crate::core::{CrewRunner, ResultExtractor, RunReport};
pub use adapters::{KickoffRequest, Orchestrator};
pub use domain::{ConfigRecord, ConfigValue, CrewSpec, EventDetails, RunResult, TaskResult};
pub use error::{CrewError, ErrorKind};
pub use sanitize::{clean, sanitize_record};
