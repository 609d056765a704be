use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::{status_error, LlmError, LlmResponse, Provider, TextGenerator, Usage, MAX_OUTPUT_TOKENS};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API client.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<MessagesUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl AnthropicClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    fn request_body(&self, instruction: &str) -> Value {
        json!({
            "model": self.model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "messages": [
                { "role": "user", "content": instruction }
            ]
        })
    }
}

/// Take the first text block of a Messages API response.
fn parse_response(body: MessagesResponse) -> Result<LlmResponse, LlmError> {
    let content = body
        .content
        .into_iter()
        .find(|block| block.kind == "text")
        .and_then(|block| block.text)
        .ok_or(LlmError::MissingContent(Provider::Anthropic))?;

    let usage = body
        .usage
        .map(|u| Usage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        })
        .unwrap_or_default();

    Ok(LlmResponse {
        content,
        model: body.model,
        usage,
    })
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, instruction: &str) -> Result<LlmResponse, LlmError> {
        info!("calling Anthropic API");

        let request_error = |source| LlmError::Request {
            provider: Provider::Anthropic,
            source,
        };

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(instruction))
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(status_error(Provider::Anthropic, response).await);
        }

        let body = response
            .json::<MessagesResponse>()
            .await
            .map_err(request_error)?;
        let parsed = parse_response(body)?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "received Anthropic response"
        );
        Ok(parsed)
    }
}
