use clarity_core::{AgentResponse, AgentSettings, JsonObject};
use serde_json::json;
use tracing::{debug, error, info};

use crate::agent::prompt::{system_prompt, user_prompt};
use crate::agent::validate::{ResponseError, TopicError, parse_analysis, validate_topic};
use crate::agent::{Agent, AgentInfo};
use crate::providers::{Provider, ProviderError};

pub const AGENT_NAME: &str = "ClarityAgent";
pub const AGENT_VERSION: &str = "1.0.0";

const SUCCESS_MESSAGE: &str = "Analysis completed successfully";

/// Failure of one pipeline stage.
#[derive(Debug, thiserror::Error)]
enum AgentError {
    #[error(transparent)]
    Input(#[from] TopicError),
    #[error("Internal error: {0}")]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// Turns a topic into a balanced pros/cons analysis through one provider call.
pub struct ClarityAgent {
    provider: Box<dyn Provider>,
    max_topic_length: usize,
    system_prompt: String,
}

impl ClarityAgent {
    pub fn new(provider: Box<dyn Provider>, settings: &AgentSettings) -> Self {
        Self {
            provider,
            max_topic_length: settings.max_topic_length,
            system_prompt: system_prompt(settings.max_pros_cons),
        }
    }

    /// Validate → prompt → call provider → parse → check shape.
    async fn run(&self, topic: &str) -> Result<AgentResponse, AgentError> {
        validate_topic(topic, self.max_topic_length)?;

        let llm_response = self
            .provider
            .generate_response(&user_prompt(topic), Some(&self.system_prompt))
            .await?;
        debug!(
            "{} returned {} characters ({} tokens)",
            self.provider.name(),
            llm_response.content.len(),
            llm_response.total_tokens()
        );

        let data = parse_analysis(&llm_response.content).inspect_err(|e| match e {
            ResponseError::Shape { reason } => error!("Invalid analysis structure: {}", reason),
            _ => error!("Error parsing JSON response: {}", llm_response.content),
        })?;

        let mut metadata = JsonObject::new();
        metadata.insert("model_used".to_string(), json!(llm_response.model));
        metadata.insert("tokens_used".to_string(), json!(llm_response.total_tokens()));
        metadata.insert("provider".to_string(), json!(self.provider.model_info().provider));

        Ok(AgentResponse::success(data, SUCCESS_MESSAGE, metadata))
    }
}

#[async_trait::async_trait]
impl Agent for ClarityAgent {
    async fn process(&self, topic: &str) -> AgentResponse {
        match self.run(topic).await {
            Ok(response) => response,
            Err(AgentError::Input(e)) => {
                info!("Rejected topic: {}", e);
                AgentResponse::failure(e.to_string())
            }
            Err(e @ AgentError::Provider(_)) => {
                error!("Error in ClarityAgent.process: {}", e);
                AgentResponse::failure(e.to_string())
            }
            Err(e @ AgentError::Response(_)) => AgentResponse::failure(e.to_string()),
        }
    }

    fn info(&self) -> AgentInfo {
        AgentInfo {
            name: AGENT_NAME.to_string(),
            description: "Analyzes topics and provides balanced pros and cons".to_string(),
            version: AGENT_VERSION.to_string(),
            llm_provider: self.provider.model_info(),
            capabilities: vec![
                "Critical topic analysis".to_string(),
                "Pros and cons generation".to_string(),
                "Balanced thinking".to_string(),
            ],
        }
    }
}
