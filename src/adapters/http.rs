//! HTTP orchestrator.
//!
//! Talks to an orchestration service exposing `POST /kickoff` and
//! `GET /health`. Credentials travel as request headers and are never part
//! of the JSON body.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::{KickoffRequest, Orchestrator};
use crate::config::Credentials;
use crate::domain::RunResult;

pub const MODEL_KEY_HEADER: &str = "x-model-api-key";
pub const SEARCH_KEY_HEADER: &str = "x-search-api-key";
pub const MODEL_BASE_HEADER: &str = "x-model-api-base";

/// Orchestrator reached over HTTP
pub struct HttpOrchestrator {
    /// Base URL, without trailing slash
    endpoint: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl HttpOrchestrator {
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            endpoint,
            credentials,
            client: reqwest::Client::new(),
        }
    }

    /// Build API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }
}

#[async_trait]
impl Orchestrator for HttpOrchestrator {
    fn name(&self) -> &str {
        "http"
    }

    async fn kickoff(&self, request: &KickoffRequest, run_timeout: Duration) -> Result<RunResult> {
        let url = self.api_url("kickoff");
        debug!(%url, "Posting kickoff request");

        let response = self
            .client
            .post(&url)
            .timeout(run_timeout)
            .header(MODEL_KEY_HEADER, &self.credentials.model_api_key)
            .header(SEARCH_KEY_HEADER, &self.credentials.search_api_key)
            .header(MODEL_BASE_HEADER, &self.credentials.api_base)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Kickoff request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Orchestrator returned {}: {}", status, body.trim());
        }

        response
            .json::<RunResult>()
            .await
            .context("Orchestrator reply is not a valid run result")
    }

    async fn health_check(&self) -> Result<()> {
        let url = self.api_url("health");
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .with_context(|| format!("Health check request to {} failed", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Orchestrator health check failed: {}", response.status());
        }

        Ok(())
    }
}
