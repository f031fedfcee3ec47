//! Builds provider clients from configuration, one per request.

use std::sync::Arc;

use clarity_core::{Config, ProviderType};
use tracing::{error, info};

use crate::providers::anthropic::AnthropicClient;
use crate::providers::openai::OpenAiClient;
use crate::providers::provider::{Provider, ProviderError};

/// Errors raised while turning configuration into a provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderConfigError {
    #[error("{provider} API key not configured (set {env})")]
    MissingApiKey {
        provider: ProviderType,
        env: &'static str,
    },
    #[error("Failed to build {provider} client: {source}")]
    Build {
        provider: ProviderType,
        #[source]
        source: ProviderError,
    },
}

impl ProviderConfigError {
    pub fn provider(&self) -> ProviderType {
        match self {
            ProviderConfigError::MissingApiKey { provider, .. } => *provider,
            ProviderConfigError::Build { provider, .. } => *provider,
        }
    }
}

/// Source of provider clients for the HTTP layer.
pub trait ProviderFactory: Send + Sync {
    /// Provider used when a request does not name one.
    fn default_provider(&self) -> ProviderType;

    /// Build a client for `provider`, or the default provider when `None`.
    fn create(
        &self,
        provider: Option<ProviderType>,
    ) -> Result<Box<dyn Provider>, ProviderConfigError>;
}

/// Factory backed by the process configuration.
pub struct ConfigProviderFactory {
    config: Arc<Config>,
}

impl ConfigProviderFactory {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

impl ProviderFactory for ConfigProviderFactory {
    fn default_provider(&self) -> ProviderType {
        self.config.default_provider()
    }

    fn create(
        &self,
        provider: Option<ProviderType>,
    ) -> Result<Box<dyn Provider>, ProviderConfigError> {
        let provider = provider.unwrap_or_else(|| self.default_provider());
        create_provider(&self.config, provider).inspect_err(|e| {
            error!("Error creating LLM provider {}: {}", provider, e);
        })
    }
}

/// Build a client for `provider` from configuration.
///
/// Fails before any network call when the provider's API key is missing.
pub fn create_provider(
    config: &Config,
    provider: ProviderType,
) -> Result<Box<dyn Provider>, ProviderConfigError> {
    let api_key = config
        .api_key(provider)
        .ok_or(ProviderConfigError::MissingApiKey {
            provider,
            env: provider.api_key_env(),
        })?;
    let model = config.model(provider);
    let base_url = config.base_url(provider);
    let dump_queries = config.settings.logging.dump_queries;
    let build_err = |source| ProviderConfigError::Build { provider, source };

    let client: Box<dyn Provider> = match provider {
        ProviderType::OpenAi => Box::new(
            OpenAiClient::new(api_key, model)
                .map_err(build_err)?
                .with_base_url(base_url)
                .with_dump_queries(dump_queries),
        ),
        ProviderType::Anthropic => Box::new(
            AnthropicClient::new(api_key, model)
                .map_err(build_err)?
                .with_base_url(base_url)
                .with_dump_queries(dump_queries),
        ),
    };

    info!("Created {} provider with model {}", provider, model);
    Ok(client)
}
