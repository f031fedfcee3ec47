pub mod anthropic;
pub mod factory;
pub mod openai;
pub mod provider;
pub mod query_dump;

pub use factory::{ConfigProviderFactory, ProviderConfigError, ProviderFactory, create_provider};
pub use provider::{LlmResponse, ModelInfo, Provider, ProviderError};
