pub mod agent;
pub mod logging;
pub mod providers;
pub mod server;
pub mod state;

pub use agent::{Agent, AgentInfo, ClarityAgent};
pub use providers::{
    ConfigProviderFactory, LlmResponse, ModelInfo, Provider, ProviderConfigError, ProviderError,
    ProviderFactory,
};
pub use state::AppState;
