use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::{status_error, LlmError, LlmResponse, Provider, TextGenerator, Usage, MAX_OUTPUT_TOKENS};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are a TypeScript expert. Fix only the type errors specified. \
Do not refactor, rename, or change any logic. \
Return the complete corrected file inside a single fenced code block.";

/// OpenAI Chat Completions client.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl OpenAiClient {
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
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": instruction }
            ]
        })
    }
}

/// Take the first choice's message; empty content counts as missing.
fn parse_response(body: ChatResponse) -> Result<LlmResponse, LlmError> {
    let content = body
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or(LlmError::MissingContent(Provider::OpenAi))?;

    let usage = body
        .usage
        .map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(LlmResponse {
        content,
        model: body.model,
        usage,
    })
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model))]
    async fn generate(&self, instruction: &str) -> Result<LlmResponse, LlmError> {
        info!("calling OpenAI API");

        let request_error = |source| LlmError::Request {
            provider: Provider::OpenAi,
            source,
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(instruction))
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(status_error(Provider::OpenAi, response).await);
        }

        let body = response.json::<ChatResponse>().await.map_err(request_error)?;
        let parsed = parse_response(body)?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "received OpenAI response"
        );
        Ok(parsed)
    }
}
