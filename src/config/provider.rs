//! Extraction backend selection
//!
//! A [`ProviderConfig`] is built once at startup and passed by value through
//! the pipeline. Building it reads the provider's API key from the
//! environment and fails before any network call if the key is absent.

use crate::ExtractError;
use std::fmt;
use std::str::FromStr;

/// Supported extraction backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    DeepSeek,
    ChatGpt,
}

impl Provider {
    /// Environment variable holding the API key
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::ChatGpt => "OPENAI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::DeepSeek => "deepseek-chat",
            Self::ChatGpt => "gpt-4o-mini",
        }
    }

    /// Base URL of the provider's OpenAI-compatible API
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::DeepSeek => "https://api.deepseek.com",
            Self::ChatGpt => "https://api.openai.com/v1",
        }
    }
}

impl FromStr for Provider {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Ok(Self::DeepSeek),
            "chatgpt" | "openai" => Ok(Self::ChatGpt),
            _ => Err(ExtractError::UnsupportedProvider(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeepSeek => f.write_str("DeepSeek"),
            Self::ChatGpt => f.write_str("ChatGPT"),
        }
    }
}

/// Resolved extraction backend: provider, model, credentials and endpoint
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    provider: Provider,
    model: String,
    api_key: String,
    base_url: String,
}

impl ProviderConfig {
    /// Builds the configuration for a provider, reading its key from the
    /// process environment
    ///
    /// # Errors
    ///
    /// * `UnsupportedProvider` - `provider_name` is not a known provider
    /// * `MissingCredential` - the provider's key variable is unset or blank
    pub fn build(provider_name: &str) -> Result<Self, ExtractError> {
        Self::build_with(provider_name, |var| std::env::var(var).ok())
    }

    /// Same as [`build`](Self::build) with an injectable variable lookup
    pub fn build_with<F>(provider_name: &str, lookup: F) -> Result<Self, ExtractError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider: Provider = provider_name.parse()?;
        let variable = provider.api_key_var();

        let api_key = lookup(variable)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ExtractError::MissingCredential {
                variable: variable.to_string(),
            })?;

        tracing::debug!("Resolved provider {} (key from {})", provider, variable);

        Ok(Self {
            provider,
            model: provider.default_model().to_string(),
            api_key,
            base_url: provider.default_base_url().to_string(),
        })
    }

    /// Overrides the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the chat-completions endpoint
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}
