//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clarity_core::{Config, ProviderType, Secrets, Settings};
use clarity_gateway::providers::{
    LlmResponse, ModelInfo, Provider, ProviderConfigError, ProviderError, ProviderFactory,
};
use clarity_gateway::state::AppState;

pub const REMOTE_WORK_ANALYSIS: &str = r#"{"topic":"Remote work","analysis":{"pros":["flexibility"],"cons":["isolation"]},"summary":"mixed"}"#;

/// What a [`MockProvider`] does when called.
#[derive(Clone)]
pub enum Reply {
    Content(String),
    Status(u16),
    Panic,
}

/// Provider returning a canned reply and counting calls.
#[derive(Clone)]
pub struct MockProvider {
    pub provider: ProviderType,
    pub reply: Reply,
    pub calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new(provider: ProviderType, reply: Reply) -> Self {
        Self {
            provider,
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn replying(content: &str) -> Self {
        Self::new(ProviderType::OpenAi, Reply::Content(content.to_string()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate_response(
        &self,
        _prompt: &str,
        _system_prompt: Option<&str>,
    ) -> Result<LlmResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Reply::Content(content) => Ok(LlmResponse {
                content: content.clone(),
                model: "mock-model".to_string(),
                usage: BTreeMap::from([("total_tokens".to_string(), 42)]),
            }),
            Reply::Status(status) => Err(ProviderError::ApiError {
                status: *status,
                message: "mock failure".to_string(),
            }),
            Reply::Panic => panic!("mock provider exploded"),
        }
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: self.provider.to_string(),
            model: "mock-model".to_string(),
            max_tokens: 4096,
            supports_system_messages: true,
        }
    }

    fn clone_box(&self) -> Box<dyn Provider> {
        Box::new(self.clone())
    }
}

/// Factory handing out mock providers; unknown providers fail like a missing key.
pub struct MockFactory {
    pub default: ProviderType,
    pub providers: HashMap<ProviderType, MockProvider>,
}

impl MockFactory {
    pub fn single(provider: MockProvider) -> Self {
        Self {
            default: provider.provider,
            providers: HashMap::from([(provider.provider, provider)]),
        }
    }
}

impl ProviderFactory for MockFactory {
    fn default_provider(&self) -> ProviderType {
        self.default
    }

    fn create(
        &self,
        provider: Option<ProviderType>,
    ) -> Result<Box<dyn Provider>, ProviderConfigError> {
        let provider = provider.unwrap_or(self.default);
        self.providers
            .get(&provider)
            .map(|mock| mock.clone_box())
            .ok_or(ProviderConfigError::MissingApiKey {
                provider,
                env: provider.api_key_env(),
            })
    }
}

/// Config with the given keys and default settings.
pub fn config_with_keys(openai: Option<&str>, anthropic: Option<&str>) -> Config {
    Config::new(
        Secrets {
            openai_api_key: openai.map(str::to_string),
            anthropic_api_key: anthropic.map(str::to_string),
        },
        Settings::default(),
    )
}

/// App state whose only provider is `mock`, with a matching API key configured.
pub fn mock_state(mock: MockProvider) -> Arc<AppState> {
    let config = match mock.provider {
        ProviderType::OpenAi => config_with_keys(Some("sk-test"), None),
        ProviderType::Anthropic => config_with_keys(None, Some("sk-ant-test")),
    };
    Arc::new(AppState::with_factory(
        config,
        Arc::new(MockFactory::single(mock)),
    ))
}
