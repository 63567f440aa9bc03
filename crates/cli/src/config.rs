//! Configuration loading from reagent.toml.

use runtime::tools::builtin::BuiltinConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_OPENAI_MODEL: &str = "Qwen/Qwen3-8B";
const DEFAULT_OPENAI_BASE_URL: &str = "http://localhost:8000/v1";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Built-in tool settings.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Which completion backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Provider {
    /// Anthropic Messages API.
    #[default]
    #[serde(rename = "anthropic")]
    Anthropic,
    /// Any OpenAI-compatible `/chat/completions` server.
    #[serde(rename = "openai")]
    OpenAi,
}

/// Backend provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub provider: Provider,

    /// Model to use. Defaults per provider.
    pub model: Option<String>,

    /// Anthropic API key (sk-ant-api01-...) or OpenAI-compatible bearer key.
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible server.
    pub base_url: String,

    pub max_tokens: u32,

    /// Qwen3 thinking switch, openai provider only.
    pub enable_thinking: Option<bool>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            max_tokens: 4096,
            enable_thinking: None,
            timeout_secs: 300,
        }
    }
}

/// Built-in tool configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub google_search: GoogleSearchConfig,

    /// Per-request timeout in seconds for HTTP-backed tools.
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            google_search: GoogleSearchConfig::default(),
            timeout_secs: 30,
        }
    }
}

/// Google Custom Search credentials.
#[derive(Debug, Default, Deserialize)]
pub struct GoogleSearchConfig {
    pub api_key: Option<String>,
    /// Programmable Search Engine ID (`cx`).
    pub engine_id: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive, used when RUST_LOG is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Fill unset secrets and the model from the environment.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        let backend = &mut self.backend;
        if backend.api_key.is_none() {
            backend.api_key = match backend.provider {
                Provider::Anthropic => var("ANTHROPIC_API_KEY"),
                Provider::OpenAi => var("OPENAI_API_KEY"),
            };
        }
        if backend.model.is_none() {
            backend.model = var("REAGENT_MODEL");
        }

        let google = &mut self.tools.google_search;
        if google.api_key.is_none() {
            google.api_key = var("GOOGLE_API_KEY");
        }
        if google.engine_id.is_none() {
            google.engine_id = var("GOOGLE_CSE_ID");
        }
    }

    /// The configured model, or the provider's default.
    pub fn model(&self) -> String {
        self.backend
            .model
            .clone()
            .unwrap_or_else(|| match self.backend.provider {
                Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL.to_string(),
                Provider::OpenAi => DEFAULT_OPENAI_MODEL.to_string(),
            })
    }

    /// The Anthropic API key; the anthropic provider cannot run without one.
    pub fn anthropic_key(&self) -> Result<&str, ConfigError> {
        self.backend
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Settings for the built-in tool registry.
    pub fn builtin_config(&self) -> BuiltinConfig {
        BuiltinConfig {
            google_api_key: self.tools.google_search.api_key.clone(),
            google_engine_id: self.tools.google_search.engine_id.clone(),
            timeout: Duration::from_secs(self.tools.timeout_secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set backend.api_key or ANTHROPIC_API_KEY")]
    MissingApiKey,
}
