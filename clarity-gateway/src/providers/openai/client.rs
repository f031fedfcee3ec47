//! OpenAI Chat Completions API client.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clarity_core::ProviderType;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::providers::provider::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, LlmResponse, ModelInfo, Provider, ProviderError,
    body_preview, build_http_client, require_api_key,
};
use crate::providers::query_dump::{QUERY_DIR, QueryDump};

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API client.
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    dump_dir: Option<PathBuf>,
}

/// Request body for the Chat Completions API
#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// OpenAI message format
#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

/// Choice in the response
#[derive(Debug, Deserialize)]
struct Choice {
    message: OpenAiMessage,
}

/// Usage information
#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: Option<u64>,
}

impl OpenAiClient {
    /// Create a new OpenAI client.
    ///
    /// Fails with [`ProviderError::MissingCredentials`] when `api_key` is blank.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let api_key = require_api_key(ProviderType::OpenAi, api_key.into())?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let model = model.into();
        tracing::info!("OpenAI provider initialized with model: {}", model);

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
        self.base_url = base_url.into();
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

    fn chat_completions_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }

    fn auth_header(&self) -> Result<HeaderValue, ProviderError> {
        HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
            ProviderError::InvalidFormat("API key contains invalid header characters".to_string())
        })
    }

    /// Build the message list: optional system message first, then the user prompt.
    fn build_messages(prompt: &str, system_prompt: Option<&str>) -> Vec<OpenAiMessage> {
        let mut messages = Vec::with_capacity(2);

        if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
            messages.push(OpenAiMessage {
                role: "system".to_string(),
                content: Some(system.to_string()),
            });
        }

        messages.push(OpenAiMessage {
            role: "user".to_string(),
            content: Some(prompt.to_string()),
        });

        messages
    }

    /// Convert an OpenAI response to the provider-neutral response
    fn convert_response(
        &self,
        response: ChatCompletionsResponse,
    ) -> Result<LlmResponse, ProviderError> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProviderError::NoContent)?;

        let mut usage = BTreeMap::new();
        if let Some(u) = response.usage {
            usage.insert("prompt_tokens".to_string(), u.prompt_tokens);
            usage.insert("completion_tokens".to_string(), u.completion_tokens);
            usage.insert(
                "total_tokens".to_string(),
                u.total_tokens.unwrap_or(u.prompt_tokens + u.completion_tokens),
            );
        }

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiClient {
    fn name(&self) -> &str {
        ProviderType::OpenAi.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_response(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<LlmResponse, ProviderError> {
        let request_body = ChatCompletionsRequest {
            model: &self.model,
            messages: Self::build_messages(prompt, system_prompt),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        let dump = match &self.dump_dir {
            Some(dir) => match serde_json::to_value(&request_body) {
                Ok(val) => QueryDump::request(dir, "openai", &self.model, &val).await,
                Err(_) => None,
            },
            None => None,
        };

        let response = self
            .http_client
            .post(self.chat_completions_url())
            .header(AUTHORIZATION, self.auth_header()?)
            .json(&request_body)
            .send()
            .await
            .inspect_err(|e| tracing::error!("Error generating OpenAI response: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI API returned HTTP {}", status);
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

        let completions: ChatCompletionsResponse = serde_json::from_str(&response_text)
            .map_err(|e| {
                ProviderError::InvalidFormat(format!(
                    "Failed to parse OpenAI response: {e}\nBody preview: {}",
                    body_preview(&response_text)
                ))
            })?;

        self.convert_response(completions)
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            provider: self.name().to_string(),
            model: self.model.clone(),
            max_tokens: if self.model.contains("gpt-3.5") {
                4096
            } else {
                8192
            },
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
    fn test_openai_client_creation() {
        let client = OpenAiClient::new("sk-test", "gpt-3.5-turbo").unwrap();
        assert_eq!(client.model(), "gpt-3.5-turbo");
        assert_eq!(
            client.chat_completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenAiClient::new("   ", "gpt-3.5-turbo");
        assert!(matches!(
            result,
            Err(ProviderError::MissingCredentials(ProviderType::OpenAi))
        ));
    }

    #[test]
    fn test_chat_completions_url_without_v1_suffix() {
        let client = OpenAiClient::new("sk-test", "gpt-4")
            .unwrap()
            .with_base_url("http://127.0.0.1:8080/");
        assert_eq!(
            client.chat_completions_url(),
            "http://127.0.0.1:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_build_messages_with_system() {
        let messages = OpenAiClient::build_messages("Analyze this", Some("You are helpful"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content.as_deref(), Some("You are helpful"));
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content.as_deref(), Some("Analyze this"));
    }

    #[test]
    fn test_build_messages_without_system() {
        let messages = OpenAiClient::build_messages("Analyze this", None);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_convert_response_usage() {
        let client = OpenAiClient::new("sk-test", "gpt-4").unwrap();
        let response: ChatCompletionsResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4-0613",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "{\"ok\": true}"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21}
        }))
        .unwrap();

        let llm = client.convert_response(response).unwrap();
        assert_eq!(llm.content, "{\"ok\": true}");
        assert_eq!(llm.model, "gpt-4");
        assert_eq!(llm.usage["prompt_tokens"], 9);
        assert_eq!(llm.usage["completion_tokens"], 12);
        assert_eq!(llm.total_tokens(), 21);
    }

    #[test]
    fn test_convert_response_without_choices() {
        let client = OpenAiClient::new("sk-test", "gpt-4").unwrap();
        let response: ChatCompletionsResponse =
            serde_json::from_value(serde_json::json!({"choices": []})).unwrap();

        assert!(matches!(
            client.convert_response(response),
            Err(ProviderError::NoContent)
        ));
    }

    #[test]
    fn test_model_info_context_window() {
        let small = OpenAiClient::new("sk-test", "gpt-3.5-turbo").unwrap();
        assert_eq!(small.model_info().max_tokens, 4096);

        let large = OpenAiClient::new("sk-test", "gpt-4").unwrap();
        let info = large.model_info();
        assert_eq!(info.max_tokens, 8192);
        assert_eq!(info.provider, "openai");
        assert!(info.supports_system_messages);
    }
}
