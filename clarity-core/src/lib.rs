pub mod config;
pub mod message;

// Config re-exports
pub use config::{
    AgentSettings, Config, ConfigError, LoggingSettings, Secrets, SecretsError, Settings,
    SettingsError, check_key_format, load_dotenv,
};

// Message re-exports
pub use message::{AgentResponse, JsonObject, ProviderType};
