//! Subprocess orchestrator.
//!
//! Spawns an external crew runner, writes the kickoff request as JSON to its
//! stdin and reads the run result as JSON from its stdout. Credentials reach
//! the runner through its environment.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use super::{KickoffRequest, Orchestrator};
use crate::config::Credentials;
use crate::domain::RunResult;

/// Orchestrator reached by spawning a runner binary
pub struct CommandOrchestrator {
    /// Path to the runner binary
    program: String,

    /// Extra arguments passed before the request is piped in
    args: Vec<String>,

    credentials: Credentials,
}

impl CommandOrchestrator {
    pub fn new(program: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            credentials,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(self.credentials.env_vars());
        cmd
    }
}

#[async_trait]
impl Orchestrator for CommandOrchestrator {
    fn name(&self) -> &str {
        "command"
    }

    async fn kickoff(&self, request: &KickoffRequest, run_timeout: Duration) -> Result<RunResult> {
        let payload = serde_json::to_vec(request).context("Failed to serialize kickoff request")?;

        let mut child = self
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn orchestrator '{}'", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .context("Orchestrator stdin was not captured")?;
        // stdin is dropped when the write finishes, signalling EOF
        let feed = async move {
            stdin
                .write_all(&payload)
                .await
                .context("Failed to write kickoff request to orchestrator stdin")
        };

        // Feed stdin while stdout/stderr drain; the timeout covers both
        let (fed, output) = timeout(run_timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .with_context(|| format!("Orchestrator timed out after {:?}", run_timeout))?;
        let output =
            output.with_context(|| format!("Failed to wait for orchestrator '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);
            anyhow::bail!(
                "Orchestrator '{}' failed with exit code {}: {}",
                self.program,
                exit_code,
                stderr.trim()
            );
        }

        fed?;
        debug!(bytes = output.stdout.len(), "Orchestrator replied");

        serde_json::from_slice(&output.stdout).context("Orchestrator reply is not a valid run result")
    }

    async fn health_check(&self) -> Result<()> {
        let output = self
            .command()
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("Failed to run orchestrator '{}'", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Orchestrator health check failed: {}", stderr.trim());
        }

        Ok(())
    }
}
