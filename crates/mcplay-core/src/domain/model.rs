//! Model/provider selection carried for the conversational layer.
//!
//! mcplay never interprets these values beyond validating ranges; they are
//! handed as-is to whichever component talks to the model provider.

use serde::{Deserialize, Serialize};

/// Lower bound for `max_tokens`.
pub const MIN_MAX_TOKENS: u32 = 1024;

/// Upper bound for `max_tokens`.
pub const MAX_MAX_TOKENS: u32 = 10240;

/// Default `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;

/// Supported model providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
    Google,
    Bedrock,
}

impl Provider {
    /// All providers in display order.
    pub const ALL: [Self; 4] = [Self::OpenAi, Self::Anthropic, Self::Google, Self::Bedrock];

    /// Default model identifier for the provider.
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Anthropic => "claude-3-5-sonnet-20240620",
            Self::Google => "gemini-2.0-flash-001",
            Self::Bedrock => "anthropic.claude-3-5-sonnet-20240620-v1:0",
        }
    }

    /// Parse a provider from its lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "google" => Some(Self::Google),
            "bedrock" => Some(Self::Bedrock),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::Bedrock => "bedrock",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider credentials.
///
/// Stored in plain text in the config file. This is NOT a secret store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    #[default]
    None,
    ApiKey {
        api_key: String,
    },
    Bedrock {
        region_name: String,
        aws_access_key: String,
        aws_secret_key: String,
    },
}

/// Model parameters for the conversational collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub provider: Provider,
    pub model_id: String,
    pub credentials: Credentials,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self::for_provider(Provider::default())
    }
}

impl ModelParams {
    /// Defaults for the given provider.
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            model_id: provider.default_model().to_string(),
            credentials: Credentials::None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Validate ranges and credential shape.
    pub fn validate(&self) -> Result<(), String> {
        if self.model_id.trim().is_empty() {
            return Err("model_id cannot be empty".to_string());
        }
        if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&self.max_tokens) {
            return Err(format!(
                "max_tokens must be between {MIN_MAX_TOKENS} and {MAX_MAX_TOKENS}, got {}",
                self.max_tokens
            ));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            ));
        }
        match (&self.credentials, self.provider) {
            (Credentials::ApiKey { .. }, Provider::Bedrock) => {
                Err("bedrock requires AWS credentials, not an API key".to_string())
            }
            (Credentials::Bedrock { .. }, provider) if provider != Provider::Bedrock => Err(
                format!("{provider} takes an API key, not AWS credentials"),
            ),
            _ => Ok(()),
        }
    }
}
