//! Provider trait for abstracting different LLM providers.

use std::collections::BTreeMap;
use std::time::Duration;

use clarity_core::ProviderType;
use serde::{Deserialize, Serialize};

/// Sampling temperature sent to every vendor.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Completion token cap sent to every vendor.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Unified response type across providers.
///
/// `usage` keeps the vendor's own counter names and always carries `total_tokens`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    #[serde(default)]
    pub usage: BTreeMap<String, u64>,
}

impl LlmResponse {
    /// Total tokens billed for the call, 0 when the vendor did not report usage.
    pub fn total_tokens(&self) -> u64 {
        self.usage.get("total_tokens").copied().unwrap_or(0)
    }
}

/// Static capability metadata for a configured model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub provider: String,
    pub model: String,
    /// Context window size in tokens
    pub max_tokens: u32,
    pub supports_system_messages: bool,
}

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{0} API key is required")]
    MissingCredentials(ProviderType),
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("No content in response")]
    NoContent,
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

/// Provider trait for different LLM backends
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Current model
    fn model(&self) -> &str;

    /// Generate a single completion for `prompt`, optionally steered by a system prompt.
    async fn generate_response(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
    ) -> Result<LlmResponse, ProviderError>;

    /// Static capability metadata
    fn model_info(&self) -> ModelInfo;

    /// Clone the provider (boxed)
    fn clone_box(&self) -> Box<dyn Provider>;
}

impl Clone for Box<dyn Provider> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Reject empty credentials before any client is built.
pub(crate) fn require_api_key(
    provider: ProviderType,
    api_key: String,
) -> Result<String, ProviderError> {
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        return Err(ProviderError::MissingCredentials(provider));
    }
    Ok(api_key)
}

/// Shared HTTP client setup for vendor clients.
pub(crate) fn build_http_client(
    headers: reqwest::header::HeaderMap,
) -> Result<reqwest::Client, ProviderError> {
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Shorten a response body for error messages.
pub(crate) fn body_preview(body: &str) -> &str {
    if body.len() <= 500 {
        return body;
    }
    let mut end = 500;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
