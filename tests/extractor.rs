//! Result Extractor Integration Tests
//!
//! Structured vs free-text classification and artifact persistence.

use eventcrew::core::{ArtifactStore, Extracted, ResultExtractor, SUMMARY_FILE, VENUE_DATA_FILE};
use eventcrew::domain::VenueDetails;
use eventcrew::{ErrorKind, RunResult, TaskResult};
use tempfile::TempDir;

fn grand_hall() -> VenueDetails {
    VenueDetails {
        name: "Grand Hall".to_string(),
        address: "123 Main St".to_string(),
        capacity: 200,
        booking_status: "confirmed".to_string(),
    }
}

#[tokio::test]
async fn test_structured_payload_written_in_schema_order() {
    let temp = TempDir::new().unwrap();
    let extractor = ResultExtractor::new(ArtifactStore::new(temp.path()));
    let run = RunResult::new(
        "Venue booked.",
        vec![TaskResult::structured("venue", grand_hall()).with_agent("Venue Coordinator")],
    );

    let report = extractor.extract(&run, &mut std::io::sink()).await.unwrap();

    let content = std::fs::read_to_string(temp.path().join(VENUE_DATA_FILE)).unwrap();
    let keys: Vec<&str> = content
        .lines()
        .filter_map(|line| line.trim().strip_prefix('"'))
        .filter_map(|rest| rest.split('"').next())
        .collect();
    assert_eq!(keys, ["name", "address", "capacity", "booking_status"]);

    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["name"], "Grand Hall");
    assert_eq!(value["address"], "123 Main St");
    assert_eq!(value["capacity"], 200);
    assert_eq!(value["booking_status"], "confirmed");
    assert_eq!(value.as_object().unwrap().len(), 4);

    match &report.extracted[0] {
        Extracted::Structured { task, venue, .. } => {
            assert_eq!(task, "venue");
            assert_eq!(venue, &grand_hall());
        }
        other => panic!("expected structured, got {:?}", other),
    }
}

#[tokio::test]
async fn test_free_text_surfaced_unchanged() {
    let temp = TempDir::new().unwrap();
    let extractor = ResultExtractor::new(ArtifactStore::new(temp.path()));
    let text = "Engaged 250 attendees via 3 channels.";
    let run = RunResult::new(text, vec![TaskResult::text("marketing", text)]);

    let mut echo = Vec::new();
    let report = extractor.extract(&run, &mut echo).await.unwrap();

    match &report.extracted[0] {
        Extracted::FreeText { task, text: surfaced } => {
            assert_eq!(task, "marketing");
            assert_eq!(surfaced, text);
        }
        other => panic!("expected free text, got {:?}", other),
    }
    assert!(!temp.path().join(VENUE_DATA_FILE).exists());
    assert!(String::from_utf8(echo).unwrap().contains(text));
}

#[tokio::test]
async fn test_summary_is_run_text() {
    let temp = TempDir::new().unwrap();
    let extractor = ResultExtractor::new(ArtifactStore::new(temp.path()));
    let run = RunResult::new(
        "# Event plan\n\nAll set.",
        vec![
            TaskResult::structured("venue", grand_hall()),
            TaskResult::text("logistics", "Catering confirmed."),
        ],
    );

    let report = extractor.extract(&run, &mut std::io::sink()).await.unwrap();

    let summary = std::fs::read_to_string(temp.path().join(SUMMARY_FILE)).unwrap();
    assert_eq!(summary, "# Event plan\n\nAll set.");
    assert_eq!(report.summary.path, temp.path().join(SUMMARY_FILE));
}

#[tokio::test]
async fn test_rerun_overwrites_artifacts() {
    let temp = TempDir::new().unwrap();
    let extractor = ResultExtractor::new(ArtifactStore::new(temp.path()));

    let first = RunResult::new(
        "first run with more text",
        vec![TaskResult::structured("venue", grand_hall())],
    );
    extractor.extract(&first, &mut std::io::sink()).await.unwrap();

    let mut smaller = grand_hall();
    smaller.name = "Annex".to_string();
    smaller.capacity = 40;
    let second = RunResult::new("second", vec![TaskResult::structured("venue", smaller)]);
    extractor.extract(&second, &mut std::io::sink()).await.unwrap();

    let venue: VenueDetails =
        serde_json::from_str(&std::fs::read_to_string(temp.path().join(VENUE_DATA_FILE)).unwrap())
            .unwrap();
    assert_eq!(venue.name, "Annex");
    assert_eq!(venue.capacity, 40);
    assert_eq!(
        std::fs::read_to_string(temp.path().join(SUMMARY_FILE)).unwrap(),
        "second"
    );
}

#[tokio::test]
async fn test_failure_mid_pass_keeps_earlier_artifact_and_skips_summary() {
    let temp = TempDir::new().unwrap();
    let extractor = ResultExtractor::new(ArtifactStore::new(temp.path()));

    let broken = TaskResult {
        name: "logistics".to_string(),
        agent: "Logistics Manager".to_string(),
        structured: None,
        raw: None,
    };
    let run = RunResult::new(
        "partial",
        vec![
            TaskResult::structured("venue", grand_hall()),
            broken,
            TaskResult::text("marketing", "never reached"),
        ],
    );

    let mut echo = Vec::new();
    let err = extractor.extract(&run, &mut echo).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Orchestration);
    assert!(temp.path().join(VENUE_DATA_FILE).exists());
    assert!(!temp.path().join(SUMMARY_FILE).exists());
    assert!(!String::from_utf8(echo).unwrap().contains("never reached"));
}
