//! Configuration management for clarity.
//!
//! Secrets (API keys) come from environment variables only. Settings come
//! from an optional TOML file and are overridden by environment variables.
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `OPENAI_API_KEY` - OpenAI API key
//! - `ANTHROPIC_API_KEY` - Anthropic API key
//!
//! ## Settings (TOML File, `~/.config/clarity/config.toml`)
//! ```toml
//! default_provider = "openai"
//! debug = false
//!
//! [openai]
//! model = "gpt-3.5-turbo"
//!
//! [anthropic]
//! model = "claude-3-sonnet-20240229"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [agent]
//! max_topic_length = 200
//! max_pros_cons = 10
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every setting can be overridden by its environment variable
//! (`DEFAULT_LLM_PROVIDER`, `OPENAI_MODEL`, `PORT`, `MAX_TOPIC_LENGTH`, ...).

mod secrets;
mod settings;

use crate::message::ProviderType;

pub use secrets::{Secrets, SecretsError, check_key_format};
pub use settings::{
    AgentSettings, AnthropicSettings, LoggingSettings, OpenAiSettings, ServerSettings, Settings,
    SettingsError,
};

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML and environment overrides
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl Config {
    pub fn new(secrets: Secrets, settings: Settings) -> Self {
        Self { secrets, settings }
    }

    /// Load configuration from all sources.
    ///
    /// Having no provider key at all is not an error: the server still starts
    /// and reports no available providers.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env();
        let settings = Settings::load()?;
        Ok(Self { secrets, settings })
    }

    /// Log missing or malformed provider keys. Never fails.
    pub fn warn_on_key_issues(&self) {
        if self.available_providers().is_empty() {
            tracing::warn!(
                "No provider API key configured. Set OPENAI_API_KEY or ANTHROPIC_API_KEY"
            );
        } else if !self.has_provider(self.default_provider()) {
            tracing::warn!(
                "Default provider '{}' has no API key ({} is not set)",
                self.default_provider(),
                self.default_provider().api_key_env()
            );
        }

        for issue in self.secrets.format_issues() {
            tracing::warn!("{}", issue);
        }
    }

    /// Get the default provider.
    pub fn default_provider(&self) -> ProviderType {
        self.settings.default_provider
    }

    /// Check if a provider is available (has API key configured).
    pub fn has_provider(&self, provider: ProviderType) -> bool {
        self.secrets.has_provider(provider)
    }

    /// Providers with a configured API key.
    pub fn available_providers(&self) -> Vec<ProviderType> {
        self.secrets.available_providers()
    }

    /// Get the API key for a provider (if configured).
    pub fn api_key(&self, provider: ProviderType) -> Option<&str> {
        self.secrets.api_key(provider)
    }

    /// Get the model identifier for a provider.
    pub fn model(&self, provider: ProviderType) -> &str {
        self.settings.model_for(provider)
    }

    /// Get the API base URL for a provider.
    pub fn base_url(&self, provider: ProviderType) -> &str {
        self.settings.base_url_for(provider)
    }

    /// Get the HTTP bind address.
    pub fn bind_addr(&self) -> String {
        self.settings.bind_addr()
    }
}

/// Load .env file if it exists (for development convenience).
///
/// `Config::load()` runs this through `Secrets::from_env()`; it is also
/// exported for callers that read the environment directly.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
