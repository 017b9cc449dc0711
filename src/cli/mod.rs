//! Command-line interface for eventcrew.
//!
//! Provides commands for running a crew, previewing its tasks, re-extracting
//! a saved run result, sanitizing text and checking the orchestrator.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::adapters::build_orchestrator;
use crate::config::{config, Credentials, OrchestratorMode, OrchestratorSettings};
use crate::core::{ArtifactStore, CrewRunner, ResultExtractor};
use crate::domain::crew::render;
use crate::domain::{CrewSpec, EventDetails, RunResult};
use crate::sanitize::clean;

/// eventcrew - Event-planning crew runner
#[derive(Parser, Debug)]
#[command(name = "eventcrew")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a crew through the orchestrator and persist the results
    Run {
        /// Crew definition (built-in event-planning crew if not provided)
        #[arg(short, long)]
        crew: Option<PathBuf>,

        /// Event details (built-in sample event if not provided)
        #[arg(short, long)]
        details: Option<PathBuf>,

        /// Directory artifacts are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// How to reach the orchestrator
        #[arg(short, long, value_enum, env = "EVENTCREW_ORCHESTRATOR_MODE")]
        mode: Option<ModeArg>,

        /// Kickoff timeout in seconds
        #[arg(long, env = "EVENTCREW_TIMEOUT_SECONDS")]
        timeout: Option<u64>,
    },

    /// Sanitize and validate a crew, then print its rendered tasks
    Plan {
        /// Crew definition (built-in event-planning crew if not provided)
        #[arg(short, long)]
        crew: Option<PathBuf>,

        /// Event details (built-in sample event if not provided)
        #[arg(short, long)]
        details: Option<PathBuf>,
    },

    /// Extract and persist a saved run result (JSON)
    Extract {
        /// Run result file
        result: PathBuf,

        /// Directory artifacts are written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Strip non-ASCII characters from text
    Sanitize {
        /// Input file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Check that the orchestrator is reachable
    Check {
        /// How to reach the orchestrator
        #[arg(short, long, value_enum, env = "EVENTCREW_ORCHESTRATOR_MODE")]
        mode: Option<ModeArg>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Orchestrator mode for CLI (maps to OrchestratorMode)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Spawn the runner binary
    Command,

    /// Call the orchestration service
    Http,
}

impl From<ModeArg> for OrchestratorMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Command => OrchestratorMode::Command,
            ModeArg::Http => OrchestratorMode::Http,
        }
    }
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// This is the recovery boundary: any failure is reported as a single
    /// diagnostic line and turned into a failure exit code.
    pub async fn execute(self) -> ExitCode {
        let result = match self.command {
            Commands::Run {
                crew,
                details,
                output_dir,
                mode,
                timeout,
            } => run_crew(crew, details, output_dir, mode, timeout).await,
            Commands::Plan { crew, details } => plan(crew, details),
            Commands::Extract { result, output_dir } => extract(&result, output_dir).await,
            Commands::Sanitize { input } => sanitize(input),
            Commands::Check { mode } => check(mode).await,
            Commands::Config => show_config(),
        };

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error running or processing crew output: {:#}", e);
                ExitCode::FAILURE
            }
        }
    }
}

fn load_crew(path: Option<PathBuf>) -> Result<CrewSpec> {
    let crew = match path {
        Some(path) => CrewSpec::from_file(&path)?,
        None => CrewSpec::event_planning()?,
    };
    Ok(crew)
}

fn load_details(path: Option<PathBuf>) -> Result<EventDetails> {
    let details = match path {
        Some(path) => EventDetails::from_file(&path)?,
        None => EventDetails::sample()?,
    };
    Ok(details)
}

fn orchestrator_settings(
    mode: Option<ModeArg>,
    timeout: Option<u64>,
) -> Result<OrchestratorSettings> {
    let mut settings = config()?.orchestrator.clone();
    if let Some(mode) = mode {
        settings.mode = mode.into();
    }
    if let Some(timeout) = timeout {
        settings.timeout_seconds = timeout;
    }
    Ok(settings)
}

fn output_store(output_dir: Option<PathBuf>) -> Result<ArtifactStore> {
    let dir = match output_dir {
        Some(dir) => dir,
        None => config()?.output_dir.clone(),
    };
    Ok(ArtifactStore::new(dir))
}

/// Run a crew end to end
async fn run_crew(
    crew: Option<PathBuf>,
    details: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    mode: Option<ModeArg>,
    timeout: Option<u64>,
) -> Result<()> {
    let settings = orchestrator_settings(mode, timeout)?;
    let store = output_store(output_dir)?;

    // Credentials first: nothing is attempted without them
    let runner = CrewRunner::connect(
        |name| std::env::var(name).ok(),
        |credentials| build_orchestrator(&settings, credentials),
        store,
    )?
    .with_timeout(Duration::from_secs(settings.timeout_seconds));

    let crew = load_crew(crew)?;
    let details = load_details(details)?;

    eprintln!(
        "🚀 Running crew '{}' via {} orchestrator ({} tasks)",
        crew.name,
        runner.orchestrator_name(),
        crew.tasks.len()
    );

    let mut stdout = io::stdout();
    let report = runner.run(&crew, details.to_record(), &mut stdout).await?;

    eprintln!("\n✅ Crew run completed");
    eprintln!("   Run: {}", report.run_id);
    for artifact in &report.artifacts {
        eprintln!("   {} ({} bytes)", artifact.path.display(), artifact.size_bytes);
    }

    Ok(())
}

/// Print the sanitized, rendered tasks of a crew
fn plan(crew: Option<PathBuf>, details: Option<PathBuf>) -> Result<()> {
    let crew = load_crew(crew)?;
    let details = load_details(details)?;
    let (crew, inputs) = CrewRunner::prepare(&crew, details.to_record())?;

    println!("Crew: {}", crew.name);
    if !crew.description.is_empty() {
        println!("{}", crew.description);
    }

    println!("\nAgents:");
    for agent in &crew.agents {
        let tools: Vec<&str> = agent.tools.iter().map(|t| t.name()).collect();
        println!("  - {} [{}]", agent.role, tools.join(", "));
        println!("    Goal: {}", agent.goal);
    }

    println!("\nTasks:");
    for (i, task) in crew.tasks.iter().enumerate() {
        let mut flags = Vec::new();
        if task.human_input {
            flags.push("human input".to_string());
        }
        if task.async_execution {
            flags.push("async".to_string());
        }
        if let Some(schema) = task.output_schema {
            flags.push(format!("schema: {}", schema.name()));
        }
        if let Some(ref file) = task.output_file {
            flags.push(format!("file: {}", file));
        }

        println!("  {}. {} ({})", i + 1, task.name, task.agent);
        println!("     {}", render(&task.description, &inputs));
        println!("     Expected: {}", render(&task.expected_output, &inputs));
        if !flags.is_empty() {
            println!("     [{}]", flags.join(", "));
        }
    }

    Ok(())
}

/// Re-run extraction on a saved run result
async fn extract(result: &Path, output_dir: Option<PathBuf>) -> Result<()> {
    let content = std::fs::read_to_string(result)
        .with_context(|| format!("Failed to read run result: {}", result.display()))?;
    let run = RunResult::from_json(&content)?;

    let extractor = ResultExtractor::new(output_store(output_dir)?);
    let mut stdout = io::stdout();
    extractor.extract(&run, &mut stdout).await?;

    Ok(())
}

/// Clean text from a file or stdin
fn sanitize(input: Option<PathBuf>) -> Result<()> {
    let text = match input {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };

    print!("{}", clean(&text));
    Ok(())
}

/// Health check the configured orchestrator
async fn check(mode: Option<ModeArg>) -> Result<()> {
    let credentials = Credentials::from_env()?;
    let settings = orchestrator_settings(mode, None)?;
    let orchestrator = build_orchestrator(&settings, credentials)?;

    orchestrator.health_check().await?;
    eprintln!("✅ {} orchestrator is reachable", orchestrator.name());

    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config()?;

    println!("eventcrew Configuration");
    println!("=======================");
    println!();
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!("Output dir:  {}", config.output_dir.display());
    println!();
    println!("Orchestrator:");
    println!("  Mode:     {}", config.orchestrator.mode);
    println!("  Command:  {}", config.orchestrator.command);
    if !config.orchestrator.args.is_empty() {
        println!("  Args:     {}", config.orchestrator.args.join(" "));
    }
    if let Some(ref endpoint) = config.orchestrator.endpoint {
        println!("  Endpoint: {}", endpoint);
    }
    println!("  Timeout:  {}s", config.orchestrator.timeout_seconds);
    println!();

    match Credentials::from_env() {
        Ok(creds) => {
            println!("Credentials: present");
            println!("  Model:    {}", creds.model_name);
            println!("  API base: {}", creds.api_base);
        }
        Err(e) => println!("Credentials: {}", e),
    }

    Ok(())
}
