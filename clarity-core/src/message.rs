use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object payload carried in agent responses.
pub type JsonObject = Map<String, Value>;

/// Supported LLM vendors
///
/// Deserialization goes through [`FromStr`](std::str::FromStr), so config files,
/// environment variables and HTTP payloads accept the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ProviderType {
    OpenAi,
    Anthropic,
}

impl ProviderType {
    /// Every provider, in the order they are reported to callers.
    pub const ALL: [ProviderType; 2] = [ProviderType::OpenAi, ProviderType::Anthropic];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::OpenAi => "openai",
            ProviderType::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderType::OpenAi => "OPENAI_API_KEY",
            ProviderType::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "open_ai" | "open-ai" => Ok(ProviderType::OpenAi),
            "anthropic" => Ok(ProviderType::Anthropic),
            _ => Err(format!("Unsupported provider: {}", s)),
        }
    }
}

impl TryFrom<String> for ProviderType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Result of one agent run, serialized as-is to HTTP callers.
///
/// Failures carry empty `data` and `metadata`; the reason lives in `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub success: bool,
    #[serde(default)]
    pub data: JsonObject,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub metadata: JsonObject,
}

impl AgentResponse {
    pub fn success(data: JsonObject, message: impl Into<String>, metadata: JsonObject) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            metadata,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: JsonObject::new(),
            message: message.into(),
            metadata: JsonObject::new(),
        }
    }
}
