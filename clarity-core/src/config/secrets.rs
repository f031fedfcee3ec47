//! Secrets configuration loaded from environment variables only.
//!
//! API keys never live in the settings file. Empty or whitespace-only
//! values are treated as absent.

use std::env;

use crate::message::ProviderType;

/// Secrets loaded exclusively from environment variables.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// OpenAI API key (env: OPENAI_API_KEY)
    pub openai_api_key: Option<String>,

    /// Anthropic API key (env: ANTHROPIC_API_KEY)
    pub anthropic_api_key: Option<String>,
}

/// Errors reported when checking secrets
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SecretsError {
    #[error("API key required for {0}")]
    MissingSecret(ProviderType),

    #[error("{provider} API key must start with '{expected_prefix}'")]
    MalformedKey {
        provider: ProviderType,
        expected_prefix: &'static str,
    },
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// Also loads a `.env` file if present (development convenience).
    pub fn from_env() -> Self {
        super::load_dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from environment without loading .env
    pub(crate) fn from_env_inner() -> Self {
        Self {
            openai_api_key: read_key(ProviderType::OpenAi.api_key_env()),
            anthropic_api_key: read_key(ProviderType::Anthropic.api_key_env()),
        }
    }

    /// API key for a provider, if configured.
    pub fn api_key(&self, provider: ProviderType) -> Option<&str> {
        match provider {
            ProviderType::OpenAi => self.openai_api_key.as_deref(),
            ProviderType::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }

    /// Check if a specific provider is available
    pub fn has_provider(&self, provider: ProviderType) -> bool {
        self.api_key(provider).is_some()
    }

    /// Get the available providers
    pub fn available_providers(&self) -> Vec<ProviderType> {
        ProviderType::ALL
            .into_iter()
            .filter(|provider| self.has_provider(*provider))
            .collect()
    }

    /// Format problems with the configured keys, one per provider.
    ///
    /// Missing keys are not reported here; only keys that are set but look wrong.
    pub fn format_issues(&self) -> Vec<SecretsError> {
        ProviderType::ALL
            .into_iter()
            .filter_map(|provider| {
                self.api_key(provider)
                    .and_then(|key| check_key_format(provider, key).err())
            })
            .collect()
    }
}

/// Check that an API key has the vendor's expected prefix.
pub fn check_key_format(provider: ProviderType, api_key: &str) -> Result<(), SecretsError> {
    if api_key.trim().is_empty() {
        return Err(SecretsError::MissingSecret(provider));
    }

    let expected_prefix = match provider {
        ProviderType::OpenAi => "sk-",
        ProviderType::Anthropic => "sk-ant-",
    };

    if api_key.starts_with(expected_prefix) {
        Ok(())
    } else {
        Err(SecretsError::MalformedKey {
            provider,
            expected_prefix,
        })
    }
}

fn read_key(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Use a mutex to ensure tests that modify environment variables don't run concurrently
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        unsafe {
            env::remove_var("OPENAI_API_KEY");
            env::remove_var("ANTHROPIC_API_KEY");
        }
    }

    #[test]
    fn test_load_openai_only() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe { env::set_var("OPENAI_API_KEY", "sk-test") }

        let secrets = Secrets::from_env_inner();
        assert_eq!(secrets.openai_api_key, Some("sk-test".to_string()));
        assert!(secrets.anthropic_api_key.is_none());
        assert!(secrets.has_provider(ProviderType::OpenAi));
        assert!(!secrets.has_provider(ProviderType::Anthropic));
    }

    #[test]
    fn test_blank_key_is_absent() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe { env::set_var("ANTHROPIC_API_KEY", "   ") }

        let secrets = Secrets::from_env_inner();
        assert!(secrets.anthropic_api_key.is_none());
        assert!(secrets.available_providers().is_empty());
    }

    #[test]
    fn test_load_both_providers() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-openai");
            env::set_var("ANTHROPIC_API_KEY", "sk-ant-anthropic");
        }

        let secrets = Secrets::from_env_inner();
        assert_eq!(
            secrets.available_providers(),
            vec![ProviderType::OpenAi, ProviderType::Anthropic]
        );
        assert!(secrets.format_issues().is_empty());
    }

    #[test]
    fn test_from_env_keeps_process_values() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var("OPENAI_API_KEY", "sk-process");
            env::set_var("ANTHROPIC_API_KEY", "sk-ant-process");
        }

        // A .env file never overrides variables already set.
        let secrets = Secrets::from_env();
        assert_eq!(secrets.api_key(ProviderType::OpenAi), Some("sk-process"));
        assert_eq!(secrets.api_key(ProviderType::Anthropic), Some("sk-ant-process"));
        clear_env();
    }

    #[test]
    fn test_key_format() {
        assert!(check_key_format(ProviderType::OpenAi, "sk-abc").is_ok());
        assert!(check_key_format(ProviderType::Anthropic, "sk-ant-abc").is_ok());
        assert_eq!(
            check_key_format(ProviderType::Anthropic, "sk-abc"),
            Err(SecretsError::MalformedKey {
                provider: ProviderType::Anthropic,
                expected_prefix: "sk-ant-",
            })
        );
        assert_eq!(
            check_key_format(ProviderType::OpenAi, ""),
            Err(SecretsError::MissingSecret(ProviderType::OpenAi))
        );
    }

    #[test]
    fn test_format_issues_only_for_set_keys() {
        let secrets = Secrets {
            openai_api_key: Some("not-a-key".to_string()),
            anthropic_api_key: None,
        };
        let issues = secrets.format_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].to_string(),
            "openai API key must start with 'sk-'"
        );
    }
}
