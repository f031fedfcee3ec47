use std::sync::Arc;

use clarity_core::{Config, ProviderType};

use crate::agent::ClarityAgent;
use crate::providers::{ConfigProviderFactory, ProviderConfigError, ProviderFactory};

/// Shared application state
pub struct AppState {
    /// Process configuration, loaded once at startup
    pub config: Arc<Config>,
    /// Builds a provider client per request
    providers: Arc<dyn ProviderFactory>,
}

impl AppState {
    /// State backed by real vendor clients.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let providers = Arc::new(ConfigProviderFactory::new(Arc::clone(&config)));
        Self { config, providers }
    }

    /// State with a custom provider source.
    pub fn with_factory(config: Config, providers: Arc<dyn ProviderFactory>) -> Self {
        Self {
            config: Arc::new(config),
            providers,
        }
    }

    pub fn default_provider(&self) -> ProviderType {
        self.providers.default_provider()
    }

    /// Providers with an API key, in reporting order.
    pub fn available_providers(&self) -> Vec<ProviderType> {
        self.config.available_providers()
    }

    /// Build an agent bound to `provider`, or to the default provider.
    pub fn agent(
        &self,
        provider: Option<ProviderType>,
    ) -> Result<ClarityAgent, ProviderConfigError> {
        let client = self.providers.create(provider)?;
        Ok(ClarityAgent::new(client, &self.config.settings.agent))
    }
}
