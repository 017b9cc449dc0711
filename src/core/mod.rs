//! Core run logic.
//!
//! This module contains:
//! - ArtifactStore: Whole-file artifact persistence
//! - Extractor: Classification and persistence of task results
//! - Runner: Drives one crew run end to end

pub mod artifact_store;
pub mod extractor;
pub mod runner;

// Re-export commonly used types
pub use artifact_store::ArtifactStore;
pub use extractor::{ExtractionReport, Extracted, ResultExtractor, SUMMARY_FILE, VENUE_DATA_FILE};
pub use runner::{CrewRunner, RunReport};
