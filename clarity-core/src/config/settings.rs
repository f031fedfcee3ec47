//! Settings loaded from an optional TOML file, overridden by environment variables.
//!
//! The file lives at `~/.config/clarity/config.toml` (or
//! `$CLARITY_CONFIG_DIR/config.toml`). A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::message::ProviderType;

/// Settings loaded once at startup; read-only afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Provider used when a request does not name one
    #[serde(default = "default_provider")]
    pub default_provider: ProviderType,

    /// Debug mode (raises the default log level to debug)
    #[serde(default)]
    pub debug: bool,

    /// OpenAI-specific settings
    #[serde(default)]
    pub openai: OpenAiSettings,

    /// Anthropic-specific settings
    #[serde(default)]
    pub anthropic: AnthropicSettings,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Agent limits
    #[serde(default)]
    pub agent: AgentSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiSettings {
    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnthropicSettings {
    #[serde(default = "default_anthropic_model")]
    pub model: String,

    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Agent limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentSettings {
    /// Maximum topic length in characters
    #[serde(default = "default_max_topic_length")]
    pub max_topic_length: usize,

    /// Upper bound on points requested per side
    #[serde(default = "default_max_pros_cons")]
    pub max_pros_cons: usize,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to also log to a daily-rotated file
    #[serde(default)]
    pub file_enabled: bool,

    /// Directory for log files (if file_enabled is true)
    #[serde(default = "default_log_dir")]
    pub file_dir: String,

    /// Dump raw LLM request/response JSON to ./logs/queries/
    #[serde(default)]
    pub dump_queries: bool,
}

// Default value functions
fn default_provider() -> ProviderType {
    ProviderType::OpenAi
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_topic_length() -> usize {
    200
}

fn default_max_pros_cons() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            debug: false,
            openai: OpenAiSettings::default(),
            anthropic: AnthropicSettings::default(),
            server: ServerSettings::default(),
            agent: AgentSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            base_url: default_openai_base_url(),
        }
    }
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            model: default_anthropic_model(),
            base_url: default_anthropic_base_url(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_topic_length: default_max_topic_length(),
            max_pros_cons: default_max_pros_cons(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_enabled: false,
            file_dir: default_log_dir(),
            dump_queries: false,
        }
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
}

impl Settings {
    /// Load settings from the TOML file (if any), then apply environment overrides.
    pub fn load() -> Result<Self, SettingsError> {
        let mut settings = match Self::config_path() {
            Ok(path) if path.exists() => {
                tracing::info!("Loading settings from {:?}", path);
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Parse settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Get the configuration file path.
    ///
    /// Uses XDG config directory: `~/.config/clarity/config.toml`
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("CLARITY_CONFIG_DIR") {
            let dir = PathBuf::from(override_dir);
            return Ok(dir.join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("clarity");

        Ok(config_dir.join("config.toml"))
    }

    /// Override values from environment-style variables.
    ///
    /// `lookup` returns the raw value for a variable name. Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get("DEFAULT_LLM_PROVIDER") {
            self.default_provider = value.parse().map_err(|_| SettingsError::InvalidValue {
                key: "DEFAULT_LLM_PROVIDER",
                value,
            })?;
        }
        if let Some(value) = get("OPENAI_MODEL") {
            self.openai.model = value;
        }
        if let Some(value) = get("OPENAI_BASE_URL") {
            self.openai.base_url = value;
        }
        if let Some(value) = get("ANTHROPIC_MODEL") {
            self.anthropic.model = value;
        }
        if let Some(value) = get("ANTHROPIC_BASE_URL") {
            self.anthropic.base_url = value;
        }
        if let Some(value) = get("HOST") {
            self.server.host = value;
        }
        if let Some(value) = get("PORT") {
            self.server.port = parse_number("PORT", value)?;
        }
        if let Some(value) = get("DEBUG") {
            self.debug = parse_bool("DEBUG", value)?;
        }
        if let Some(value) = get("MAX_TOPIC_LENGTH") {
            self.agent.max_topic_length = parse_number("MAX_TOPIC_LENGTH", value)?;
        }
        if let Some(value) = get("MAX_PROS_CONS") {
            self.agent.max_pros_cons = parse_number("MAX_PROS_CONS", value)?;
        }
        if let Some(value) = get("LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Some(value) = get("LOG_FILE_ENABLED") {
            self.logging.file_enabled = parse_bool("LOG_FILE_ENABLED", value)?;
        }
        if let Some(value) = get("LOG_FILE_DIR") {
            self.logging.file_dir = value;
        }
        if let Some(value) = get("DUMP_QUERIES") {
            self.logging.dump_queries = parse_bool("DUMP_QUERIES", value)?;
        }

        Ok(())
    }

    /// Model identifier configured for a provider.
    pub fn model_for(&self, provider: ProviderType) -> &str {
        match provider {
            ProviderType::OpenAi => &self.openai.model,
            ProviderType::Anthropic => &self.anthropic.model,
        }
    }

    /// API base URL configured for a provider.
    pub fn base_url_for(&self, provider: ProviderType) -> &str {
        match provider {
            ProviderType::OpenAi => &self.openai.base_url,
            ProviderType::Anthropic => &self.anthropic.base_url,
        }
    }

    /// Effective log level; debug mode wins over the configured level.
    pub fn log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.logging.level
        }
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &'static str,
    value: String,
) -> Result<T, SettingsError> {
    value
        .parse()
        .map_err(|_| SettingsError::InvalidValue { key, value })
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, SettingsError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue { key, value }),
    }
}
