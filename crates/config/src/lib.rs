//! Configuration loading, validation, and management for Agentura.
//!
//! Loads configuration from `~/.agentura/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Provider engines the gateway knows how to talk to.
pub const ENGINES: &[&str] = &["ollama", "openai"];

/// The root configuration structure.
///
/// Maps directly to `~/.agentura/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Name of the provider entry used for all model calls
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Named provider configurations
    #[serde(default = "default_providers")]
    pub providers: BTreeMap<String, ProviderConfig>,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Session store configuration
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Orchestrator configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Built-in tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_provider() -> String {
    "ollama".into()
}

fn default_providers() -> BTreeMap<String, ProviderConfig> {
    let mut providers = BTreeMap::new();
    providers.insert(
        "ollama".into(),
        ProviderConfig {
            engine: "ollama".into(),
            base_url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
            api_key: None,
            headers: BTreeMap::new(),
        },
    );
    providers.insert(
        "openai".into(),
        ProviderConfig {
            engine: "openai".into(),
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o".into(),
            api_key: None,
            headers: BTreeMap::new(),
        },
    );
    providers
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

/// One language-model backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// "ollama" (native chat API) or "openai" (any OpenAI-compatible API)
    #[serde(default = "default_engine")]
    pub engine: String,

    pub base_url: String,

    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Extra HTTP headers sent with every request (e.g. a proxy's auth)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

fn default_engine() -> String {
    "ollama".into()
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("engine", &self.engine)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &redact(&self.api_key))
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8888
}
fn default_host() -> String {
    "0.0.0.0".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// "file" or "memory"
    #[serde(default = "default_sessions_backend")]
    pub backend: String,

    /// Override for the transcript directory (default: `<data dir>/sessions`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_sessions_backend() -> String {
    "file".into()
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            backend: default_sessions_backend(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Prior turns included as context in each model call
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Advisory deadline applied to each model and tool call (0 = none)
    #[serde(default)]
    pub request_timeout_secs: u64,
}

fn default_history_window() -> usize {
    6
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            request_timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_shell_timeout")]
    pub shell_timeout_secs: u64,

    /// If non-empty, only these base commands may run
    #[serde(default)]
    pub shell_allowed_commands: Vec<String>,

    /// Root directory for `file_system` reads (default: working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_root: Option<PathBuf>,

    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

fn default_shell_timeout() -> u64 {
    30
}
fn default_max_file_bytes() -> usize {
    10_000
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            shell_timeout_secs: default_shell_timeout(),
            shell_allowed_commands: vec![],
            file_root: None,
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (`<data dir>/config.toml`).
    ///
    /// Environment overrides (applied after the file):
    /// - `AGENTURA_PROVIDER` — default provider name
    /// - `AGENTURA_MODEL` — model of the default provider
    /// - `AGENTURA_API_KEY` — API key of the default provider
    /// - `API_PORT` — gateway port
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::read_file(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path (no env overrides).
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply overrides from an environment lookup function.
    fn apply_env_overrides(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(provider) = env("AGENTURA_PROVIDER") {
            self.default_provider = provider;
        }

        let model = env("AGENTURA_MODEL");
        let api_key = env("AGENTURA_API_KEY");
        if (model.is_some() || api_key.is_some())
            && let Some(active) = self.providers.get_mut(&self.default_provider)
        {
            if let Some(model) = model {
                active.model = model;
            }
            if let Some(key) = api_key {
                active.api_key = Some(key);
            }
        }

        if let Some(port) = env("API_PORT") {
            self.gateway.port = port.parse().map_err(|_| {
                ConfigError::ValidationError(format!("API_PORT must be a port number, got '{port}'"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration / data directory path.
    ///
    /// `AGENTURA_DATA_DIR` overrides the default `~/.agentura`.
    pub fn config_dir() -> PathBuf {
        std::env::var("AGENTURA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs_home().join(".agentura"))
    }

    /// Directory holding one transcript file per session.
    pub fn sessions_dir(&self) -> PathBuf {
        self.sessions
            .dir
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("sessions"))
    }

    /// The provider entry named by `default_provider`.
    pub fn active_provider(&self) -> Option<&ProviderConfig> {
        self.providers.get(&self.default_provider)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.active_provider().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "default_provider '{}' has no [providers.{}] entry",
                self.default_provider, self.default_provider
            )));
        }

        for (name, provider) in &self.providers {
            if !ENGINES.contains(&provider.engine.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "provider '{name}' has unknown engine '{}' (expected one of: {})",
                    provider.engine,
                    ENGINES.join(", ")
                )));
            }
        }

        if !matches!(self.sessions.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "sessions.backend must be 'file' or 'memory', got '{}'",
                self.sessions.backend
            )));
        }

        if self.agent.history_window == 0 {
            return Err(ConfigError::ValidationError(
                "agent.history_window must be > 0".into(),
            ));
        }

        if self.gateway.port == 0 {
            return Err(ConfigError::ValidationError("gateway.port must be > 0".into()));
        }

        if self.tools.shell_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tools.shell_timeout_secs must be > 0".into(),
            ));
        }

        if self.tools.max_file_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "tools.max_file_bytes must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: default_providers(),
            gateway: GatewayConfig::default(),
            sessions: SessionsConfig::default(),
            agent: AgentConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
