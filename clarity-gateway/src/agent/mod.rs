//! Agents turn free-text input into structured [`AgentResponse`]s.

pub mod clarity;
pub mod prompt;
pub mod validate;

use clarity_core::AgentResponse;
use serde::{Deserialize, Serialize};

use crate::providers::ModelInfo;

pub use clarity::ClarityAgent;

/// Self-description returned by `GET /agent/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
    pub version: String,
    pub llm_provider: ModelInfo,
    pub capabilities: Vec<String>,
}

#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Run the agent on `input`. Failures are reported in the response, never as `Err`.
    async fn process(&self, input: &str) -> AgentResponse;

    fn info(&self) -> AgentInfo;
}
