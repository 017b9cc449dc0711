//! Configuration for eventcrew.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (EVENTCREW_OUTPUT_DIR, EVENTCREW_ORCHESTRATOR_*)
//! 2. Config file (.eventcrew/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .eventcrew/config.yaml
//! - Falls back to <user config dir>/eventcrew/config.yaml
//! - output_dir in the config file is relative to the directory holding .eventcrew/
//!
//! Credentials are only ever read from the environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CrewError;
use crate::sanitize::ascii_fold;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const MODEL_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const SEARCH_API_KEY_VAR: &str = "SERPER_API_KEY";
pub const MODEL_NAME_VAR: &str = "OPENAI_MODEL_NAME";
pub const MODEL_API_BASE_VAR: &str = "OPENAI_API_BASE";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub output_dir: Option<String>,
    #[serde(default)]
    pub orchestrator: Option<OrchestratorFileConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrchestratorFileConfig {
    pub mode: Option<OrchestratorMode>,
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
}

/// How the orchestrator is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorMode {
    /// Spawn a runner binary
    #[default]
    Command,
    /// Call an HTTP service
    Http,
}

impl fmt::Display for OrchestratorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command => write!(f, "command"),
            Self::Http => write!(f, "http"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub mode: OrchestratorMode,
    pub command: String,
    pub args: Vec<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            mode: OrchestratorMode::Command,
            command: "crew-runner".to_string(),
            args: Vec::new(),
            endpoint: None,
            timeout_seconds: 1800,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory artifacts are written to
    pub output_dir: PathBuf,
    pub orchestrator: OrchestratorSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

/// Provider credentials and model selection, from the environment only
#[derive(Clone)]
pub struct Credentials {
    pub model_api_key: String,
    pub search_api_key: String,
    pub model_name: String,
    pub api_base: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("model_api_key", &"<redacted>")
            .field("search_api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl Credentials {
    /// Credentials with the default model and API base
    pub fn new(model_api_key: impl Into<String>, search_api_key: impl Into<String>) -> Self {
        Self {
            model_api_key: model_api_key.into(),
            search_api_key: search_api_key.into(),
            model_name: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Read credentials from the process environment
    pub fn from_env() -> Result<Self, CrewError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through a variable lookup.
    ///
    /// Both API keys are required; a missing or blank key is a
    /// configuration error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CrewError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    CrewError::configuration(format!("{} is not set", name))
                })
        };

        let model_api_key = required(MODEL_API_KEY_VAR)?;
        let search_api_key = required(SEARCH_API_KEY_VAR)?;

        let model_name = lookup(MODEL_NAME_VAR)
            .map(|v| ascii_fold(v.trim()))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = lookup(MODEL_API_BASE_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        Ok(Self {
            model_api_key,
            search_api_key,
            model_name,
            api_base,
        })
    }

    /// Environment passed to an orchestrator subprocess
    pub fn env_vars(&self) -> [(&'static str, &str); 4] {
        [
            (MODEL_API_KEY_VAR, self.model_api_key.as_str()),
            (SEARCH_API_KEY_VAR, self.search_api_key.as_str()),
            (MODEL_NAME_VAR, self.model_name.as_str()),
            (MODEL_API_BASE_VAR, self.api_base.as_str()),
        ]
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".eventcrew").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("eventcrew").join("config.yaml");
    user_config.exists().then_some(user_config)
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Merge a parsed config file and environment overrides
fn resolve(
    file: Option<(&Path, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let mut output_dir = PathBuf::from(".");
    let mut orchestrator = OrchestratorSettings::default();
    let mut config_file = None;

    if let Some((path, config)) = file {
        // Base directory is the parent of .eventcrew/
        let base_dir = path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        if let Some(ref dir) = config.output_dir {
            output_dir = resolve_path(base_dir, dir);
        }

        if let Some(file_orchestrator) = config.orchestrator {
            if let Some(mode) = file_orchestrator.mode {
                orchestrator.mode = mode;
            }
            if let Some(command) = file_orchestrator.command {
                orchestrator.command = command;
            }
            orchestrator.args = file_orchestrator.args;
            orchestrator.endpoint = file_orchestrator.endpoint;
            if let Some(timeout) = file_orchestrator.timeout_seconds {
                orchestrator.timeout_seconds = timeout;
            }
        }

        config_file = Some(path.to_path_buf());
    }

    if let Some(dir) = env("EVENTCREW_OUTPUT_DIR") {
        output_dir = PathBuf::from(dir);
    }
    if let Some(command) = env("EVENTCREW_ORCHESTRATOR_COMMAND") {
        orchestrator.command = command;
        orchestrator.mode = OrchestratorMode::Command;
    }
    if let Some(url) = env("EVENTCREW_ORCHESTRATOR_URL") {
        orchestrator.endpoint = Some(url);
        orchestrator.mode = OrchestratorMode::Http;
    }

    ResolvedConfig {
        output_dir,
        orchestrator,
        config_file,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

    match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Ok(resolve(Some((&path, config)), env))
        }
        None => Ok(resolve(None, env)),
    }
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}
