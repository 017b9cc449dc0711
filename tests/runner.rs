//! Crew Runner Integration Tests
//!
//! End-to-end runs against a scripted orchestrator.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use eventcrew::core::{ArtifactStore, CrewRunner, Extracted, SUMMARY_FILE, VENUE_DATA_FILE};
use eventcrew::domain::{ArtifactType, VenueDetails};
use eventcrew::{
    ConfigValue, CrewSpec, ErrorKind, EventDetails, KickoffRequest, Orchestrator, RunResult,
    TaskResult,
};
use tempfile::TempDir;

/// What the scripted orchestrator does on kickoff
#[derive(Clone)]
enum Script {
    Reply(RunResult),
    /// Write one file, then fail
    FailAfterWriting { path: PathBuf, message: String },
}

struct ScriptedOrchestrator {
    script: Script,
    requests: Arc<Mutex<Vec<KickoffRequest>>>,
}

impl ScriptedOrchestrator {
    fn new(script: Script) -> (Self, Arc<Mutex<Vec<KickoffRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                script,
                requests: requests.clone(),
            },
            requests,
        )
    }
}

#[async_trait]
impl Orchestrator for ScriptedOrchestrator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn kickoff(
        &self,
        request: &KickoffRequest,
        _timeout: Duration,
    ) -> anyhow::Result<RunResult> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            Script::Reply(run) => Ok(run.clone()),
            Script::FailAfterWriting { path, message } => {
                std::fs::write(path, "{\"name\": \"Grand Hall\"}")?;
                anyhow::bail!("{}", message)
            }
        }
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn grand_hall() -> VenueDetails {
    VenueDetails {
        name: "Grand Hall".to_string(),
        address: "123 Main St".to_string(),
        capacity: 200,
        booking_status: "confirmed".to_string(),
    }
}

fn full_run() -> RunResult {
    RunResult::new(
        "# AI Innovation Conference 2025\n\nVenue, logistics and marketing are in place.",
        vec![
            TaskResult::structured("venue", grand_hall())
                .with_agent("Venue Coordinator")
                .with_raw("{\"name\": \"Grand Hall\", \"address\": \"123 Main St\", \"capacity\": 200, \"booking_status\": \"confirmed\"}"),
            TaskResult::text("logistics", "Catering for 200 confirmed; projectors booked.")
                .with_agent("Logistics Manager"),
            TaskResult::text("marketing", "# Marketing\n\nEngaged 250 attendees via 3 channels.")
                .with_agent("Marketing and Communications Agent"),
        ],
    )
}

#[tokio::test]
async fn test_full_run_writes_all_artifacts() {
    let temp = TempDir::new().unwrap();
    let (orchestrator, requests) = ScriptedOrchestrator::new(Script::Reply(full_run()));
    let runner = CrewRunner::new(Box::new(orchestrator), ArtifactStore::new(temp.path()))
        .with_model("gpt-4o-mini");

    let crew = CrewSpec::event_planning().unwrap();
    let inputs = EventDetails::sample().unwrap().to_record();

    let mut echo = Vec::new();
    let report = runner.run(&crew, inputs, &mut echo).await.unwrap();

    assert_eq!(report.crew_name, "event-planning");
    assert!(report.completed_at >= report.started_at);

    let names: Vec<String> = report.artifacts.iter().map(|a| a.file_name()).collect();
    assert_eq!(
        names,
        [
            "venue_details.json",
            "marketing_report.md",
            VENUE_DATA_FILE,
            SUMMARY_FILE
        ]
    );
    assert_eq!(report.artifacts[0].artifact_type, ArtifactType::TaskOutput);
    assert_eq!(report.artifacts[3].artifact_type, ArtifactType::Summary);

    let marketing = std::fs::read_to_string(temp.path().join("marketing_report.md")).unwrap();
    assert_eq!(marketing, "# Marketing\n\nEngaged 250 attendees via 3 channels.");

    let venue: VenueDetails =
        serde_json::from_str(&std::fs::read_to_string(temp.path().join(VENUE_DATA_FILE)).unwrap())
            .unwrap();
    assert_eq!(venue, grand_hall());

    let summary = std::fs::read_to_string(temp.path().join(SUMMARY_FILE)).unwrap();
    assert!(summary.starts_with("# AI Innovation Conference 2025"));

    assert!(matches!(report.extracted[0], Extracted::Structured { .. }));
    assert!(matches!(report.extracted[1], Extracted::FreeText { .. }));

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "gpt-4o-mini");
    assert_eq!(requests[0].tasks.len(), 3);
}

#[tokio::test]
async fn test_inputs_and_crew_are_sanitized_before_kickoff() {
    let temp = TempDir::new().unwrap();
    let (orchestrator, requests) = ScriptedOrchestrator::new(Script::Reply(full_run()));
    let runner = CrewRunner::new(Box::new(orchestrator), ArtifactStore::new(temp.path()));

    let mut crew = CrewSpec::event_planning().unwrap();
    crew.agents[0].backstory = "Finds venues \u{2014} fast.".to_string();

    let mut details = EventDetails::sample().unwrap();
    details.event_city = "M\u{fc}nchen".to_string();
    details.key_requirements.push("Caf\u{e9} corner".to_string());

    runner
        .run(&crew, details.to_record(), &mut std::io::sink())
        .await
        .unwrap();

    let requests = requests.lock().unwrap();
    let request = &requests[0];
    assert!(request.inputs.is_ascii());
    assert_eq!(request.inputs.get("event_city"), Some(&ConfigValue::from("M nchen")));
    assert_eq!(request.agents[0].backstory, "Finds venues   fast.");
    assert_eq!(
        request.inputs.get("expected_participants"),
        Some(&ConfigValue::Integer(200))
    );
}

#[tokio::test]
async fn test_orchestration_failure_keeps_written_artifact() {
    let temp = TempDir::new().unwrap();
    let early = temp.path().join("venue_details.json");
    let (orchestrator, _) = ScriptedOrchestrator::new(Script::FailAfterWriting {
        path: early.clone(),
        message: "search tool rate limited".to_string(),
    });
    let runner = CrewRunner::new(Box::new(orchestrator), ArtifactStore::new(temp.path()));

    let crew = CrewSpec::event_planning().unwrap();
    let inputs = EventDetails::sample().unwrap().to_record();

    let err = runner
        .run(&crew, inputs, &mut std::io::sink())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Orchestration);
    assert!(err.to_string().contains("search tool rate limited"));
    assert!(early.exists());
    assert!(!temp.path().join(SUMMARY_FILE).exists());
    assert!(!temp.path().join(VENUE_DATA_FILE).exists());
}

#[tokio::test]
async fn test_invalid_inputs_never_reach_orchestrator() {
    let temp = TempDir::new().unwrap();
    let (orchestrator, requests) = ScriptedOrchestrator::new(Script::Reply(full_run()));
    let runner = CrewRunner::new(Box::new(orchestrator), ArtifactStore::new(temp.path()));

    let crew = CrewSpec::event_planning().unwrap();
    let inputs = eventcrew::ConfigRecord::new().with("event_topic", "Missing the rest");

    let err = runner
        .run(&crew, inputs, &mut std::io::sink())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_reply_with_empty_task_is_orchestration_error() {
    let temp = TempDir::new().unwrap();
    let reply = RunResult::new(
        "incomplete",
        vec![TaskResult {
            name: "venue".to_string(),
            agent: "Venue Coordinator".to_string(),
            structured: None,
            raw: None,
        }],
    );
    let (orchestrator, _) = ScriptedOrchestrator::new(Script::Reply(reply));
    let runner = CrewRunner::new(Box::new(orchestrator), ArtifactStore::new(temp.path()));

    let crew = CrewSpec::event_planning().unwrap();
    let inputs = EventDetails::sample().unwrap().to_record();

    let err = runner
        .run(&crew, inputs, &mut std::io::sink())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Orchestration);
    assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_missing_credentials_fail_before_kickoff() {
    let temp = TempDir::new().unwrap();
    let (orchestrator, requests) = ScriptedOrchestrator::new(Script::Reply(full_run()));
    let mut connected = false;

    let err = CrewRunner::connect(
        |name: &str| (name == "OPENAI_API_KEY").then(|| "sk-model".to_string()),
        |_credentials| {
            connected = true;
            Ok(Box::new(orchestrator) as Box<dyn Orchestrator>)
        },
        ArtifactStore::new(temp.path()),
    )
    .err()
    .unwrap();

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(err.to_string().contains("SERPER_API_KEY is not set"));
    assert!(!connected);
    assert!(requests.lock().unwrap().is_empty());
    assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_connect_uses_credential_model() {
    let temp = TempDir::new().unwrap();
    let (orchestrator, requests) = ScriptedOrchestrator::new(Script::Reply(full_run()));

    let runner = CrewRunner::connect(
        |name: &str| match name {
            "OPENAI_API_KEY" => Some("sk-model".to_string()),
            "SERPER_API_KEY" => Some("sk-search".to_string()),
            "OPENAI_MODEL_NAME" => Some("gpt-4o-caf\u{e9}".to_string()),
            _ => None,
        },
        |_credentials| Ok(Box::new(orchestrator) as Box<dyn Orchestrator>),
        ArtifactStore::new(temp.path()),
    )
    .unwrap();
    assert_eq!(runner.orchestrator_name(), "scripted");

    let crew = CrewSpec::event_planning().unwrap();
    let inputs = EventDetails::sample().unwrap().to_record();
    runner.run(&crew, inputs, &mut std::io::sink()).await.unwrap();

    assert_eq!(requests.lock().unwrap()[0].model, "gpt-4o-cafe");
}
