pub mod anthropic;
pub mod openai;
pub mod types;

pub use types::{LlmResponse, Usage};

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Upper bound on generated tokens for a single patch request.
pub const MAX_OUTPUT_TOKENS: u32 = 8192;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} API request failed: {source}")]
    Request {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {body}")]
    Status {
        provider: Provider,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("No text content in {0} response")]
    MissingContent(Provider),
}

/// Supported text-generation back ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    #[value(name = "openai")]
    OpenAi,
}

impl Provider {
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::OpenAi => "gpt-4o",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Anthropic => write!(f, "Anthropic"),
            Provider::OpenAi => write!(f, "OpenAI"),
        }
    }
}

/// A back end that turns one instruction into generated text.
/// Implementations own their credentials and model choice.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, instruction: &str) -> Result<LlmResponse, LlmError>;
}

/// API key plus optional model override for one provider.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub model: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

/// Build the generator for `provider`, falling back to its default model.
pub fn build_generator(provider: Provider, credentials: Credentials) -> Box<dyn TextGenerator> {
    let model = credentials
        .model
        .unwrap_or_else(|| provider.default_model().to_string());
    match provider {
        Provider::Anthropic => {
            Box::new(anthropic::AnthropicClient::new(credentials.api_key, model))
        }
        Provider::OpenAi => Box::new(openai::OpenAiClient::new(credentials.api_key, model)),
    }
}

/// Read a failed response's body for the error message.
pub(crate) async fn status_error(provider: Provider, response: reqwest::Response) -> LlmError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    LlmError::Status {
        provider,
        status,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models() {
        assert_eq!(Provider::Anthropic.default_model(), "claude-sonnet-4-20250514");
        assert_eq!(Provider::OpenAi.default_model(), "gpt-4o");
    }

    #[test]
    fn test_provider_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            provider: Provider,
        }
        let w: Wrapper = toml::from_str("provider = \"openai\"").unwrap();
        assert_eq!(w.provider, Provider::OpenAi);
        let w: Wrapper = toml::from_str("provider = \"anthropic\"").unwrap();
        assert_eq!(w.provider, Provider::Anthropic);
        assert!(toml::from_str::<Wrapper>("provider = \"gemini\"").is_err());
    }

    #[test]
    fn test_provider_value_enum() {
        use clap::ValueEnum;
        assert_eq!(Provider::from_str("openai", false).unwrap(), Provider::OpenAi);
        assert_eq!(Provider::from_str("anthropic", false).unwrap(), Provider::Anthropic);
    }

    #[test]
    fn test_credentials_debug_redacts_key() {
        let credentials = Credentials {
            api_key: "sk-very-secret".to_string(),
            model: None,
        };
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_missing_content_message() {
        let err = LlmError::MissingContent(Provider::OpenAi);
        assert_eq!(err.to_string(), "No text content in OpenAI response");
    }
}
