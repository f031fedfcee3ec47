//! Anthropic Messages API client.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clarity_core::ProviderType;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::providers::provider::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, LlmResponse, ModelInfo, Provider, ProviderError,
    body_preview, build_http_client, require_api_key,
};
use crate::providers::query_dump::{QUERY_DIR, QueryDump};

/// Default Anthropic API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude 3 context window
const CONTEXT_WINDOW: u32 = 200_000;

/// Anthropic API client
#[derive(Clone)]
pub struct AnthropicClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    dump_dir: Option<PathBuf>,
}

/// Request body for the Messages API
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the Messages API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// Content block in the response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Usage information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    ///
    /// Fails with [`ProviderError::MissingCredentials`] when `api_key` is blank.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = require_api_key(ProviderType::Anthropic, api_key.into())?;

        let mut headers = HeaderMap::new();
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let model = model.into();
        tracing::info!("Anthropic provider initialized with model: {}", model);

        Ok(Self {
            http_client: build_http_client(headers)?,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            dump_dir: None,
        })
    }

    /// Point the client at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Enable or disable debug query logging
    pub fn with_dump_queries(mut self, enabled: bool) -> Self {
        self.dump_dir = enabled.then(|| PathBuf::from(QUERY_DIR));
        self
    }

    /// Dump queries into a specific directory.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/messages", self.base_url)
    }

    /// Send a single-turn message and return the raw API response.
    pub async fn send_message(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<MessagesResponse, ProviderError> {
        let request_body = MessagesRequest {
            model: &self.model,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system: system_prompt.filter(|s| !s.is_empty()),
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let dump = match &self.dump_dir {
            Some(dir) => match serde_json::to_value(&request_body) {
                Ok(val) => QueryDump::request(dir, "anthropic", &self.model, &val).await,
                Err(_) => None,
            },
            None => None,
        };

        let response = self
            .http_client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await?;

        if let Some(dump) = &dump {
            match serde_json::from_str::<serde_json::Value>(&response_text) {
                Ok(val) => dump.response(&val).await,
                Err(_) => dump.response_text(&response_text).await,
            }
        }

        serde_json::from_str(&response_text).map_err(|e| {
            ProviderError::InvalidFormat(format!(
                "Failed to parse Anthropic response: {e}\nBody preview: {}",
                body_preview(&response_text)
            ))
        })
    }

    /// Extract the first text block from a response
    pub fn extract_text(response: &MessagesResponse) -> Option<String> {
        response.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            ContentBlock::Other => None,
        })
    }

    /// Convert MessagesResponse to LlmResponse
    fn to_llm_response(&self, response: &MessagesResponse) -> Result<LlmResponse, ProviderError> {
        let content = Self::extract_text(response).ok_or(ProviderError::NoContent)?;

        let mut usage = BTreeMap::new();
        if let Some(u) = &response.usage {
            usage.insert("input_tokens".to_string(), u.input_tokens);
            usage.insert("output_tokens".to_string(), u.output_tokens);
            usage.insert("total_tokens".to_string(), u.input_tokens + u.output_tokens);
        }

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for AnthropicClient {
    fn name(&self) -> &str {
        ProviderType::Anthropic.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_response(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<LlmResponse, ProviderError> {
        let response = self
            .send_message(prompt, system_prompt)
            .await
            .inspect_err(|e| tracing::error!("Error generating Anthropic response: {}", e))?;
        self.to_llm_response(&response)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: self.name().to_string(),
            model: self.model.clone(),
            max_tokens: CONTEXT_WINDOW,
            supports_system_messages: true,
        }
    }

    fn clone_box(&self) -> Box<dyn Provider> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anthropic_client_creation() {
        let client = AnthropicClient::new("sk-ant-test", "claude-3-haiku-20240307").unwrap();
        assert_eq!(client.api_key, "sk-ant-test");
        assert_eq!(client.model, "claude-3-haiku-20240307");
        assert_eq!(client.messages_url(), "https://api.anthropic.com/v1/messages");
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = AnthropicClient::new("", "claude-3-haiku-20240307");
        assert!(matches!(
            result,
            Err(ProviderError::MissingCredentials(ProviderType::Anthropic))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = AnthropicClient::new("sk-ant-test", "claude")
            .unwrap()
            .with_base_url("http://127.0.0.1:9000/v1/");
        assert_eq!(client.messages_url(), "http://127.0.0.1:9000/v1/messages");
    }

    #[test]
    fn test_request_body_with_system() {
        let request = MessagesRequest {
            model: "claude",
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system: Some("Be brief."),
            messages: vec![AnthropicMessage {
                role: "user",
                content: "Hi",
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["system"], "Be brief.");
        assert_eq!(value["max_tokens"], 1000);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Hi");
    }

    #[test]
    fn test_request_body_without_system() {
        let request = MessagesRequest {
            model: "claude",
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            system: None,
            messages: vec![],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("system").is_none());
    }

    #[test]
    fn test_usage_normalization() {
        let client = AnthropicClient::new("sk-ant-test", "claude-configured").unwrap();
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_001",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-sonnet-20240229",
            "content": [{"type": "text", "text": "Hello, world!"}],
            "stop_reason": "end_turn",
            "stop_sequence": null,
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }))
        .unwrap();

        let llm = client.to_llm_response(&response).unwrap();
        assert_eq!(llm.content, "Hello, world!");
        assert_eq!(llm.model, "claude-configured");
        assert_eq!(llm.usage["input_tokens"], 10);
        assert_eq!(llm.usage["output_tokens"], 5);
        assert_eq!(llm.total_tokens(), 15);
    }

    #[test]
    fn test_no_text_block_is_no_content() {
        let client = AnthropicClient::new("sk-ant-test", "claude").unwrap();
        let response: MessagesResponse = serde_json::from_value(serde_json::json!({
            "id": "msg_002",
            "model": "claude",
            "content": [{"type": "tool_use", "id": "t1", "name": "x", "input": {}}],
            "stop_reason": "tool_use",
            "usage": null
        }))
        .unwrap();

        assert!(matches!(
            client.to_llm_response(&response),
            Err(ProviderError::NoContent)
        ));
    }

    #[test]
    fn test_model_info() {
        let client = AnthropicClient::new("sk-ant-test", "claude-3-opus-20240229").unwrap();
        let info = client.model_info();
        assert_eq!(info.provider, "anthropic");
        assert_eq!(info.model, "claude-3-opus-20240229");
        assert_eq!(info.max_tokens, 200_000);
        assert!(info.supports_system_messages);
    }
}
