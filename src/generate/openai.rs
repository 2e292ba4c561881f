//! OpenAI / Azure OpenAI chat completions with strict JSON schema output

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{GenerationRequest, Generator, SCHEMA_NAME};
use crate::config::{GeneratorConfig, Provider};
use crate::errors::{Result, SpecmockError};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Generator backed by a chat-completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: Vec<ChatMessage<'a>>,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Chat-completions URL for the configured provider
    pub fn endpoint(&self) -> String {
        match self.config.provider() {
            Provider::OpenAi => {
                let base = self.config.base_url.as_deref().unwrap_or(OPENAI_BASE_URL);
                format!("{}/chat/completions", base.trim_end_matches('/'))
            }
            Provider::Azure => {
                let base = self.config.base_url.as_deref().unwrap_or_default();
                format!(
                    "{}/openai/deployments/{}/chat/completions?api-version={}",
                    base.trim_end_matches('/'),
                    urlencoding::encode(&self.config.model),
                    urlencoding::encode(self.config.api_version.as_deref().unwrap_or_default()),
                )
            }
        }
    }

    fn request_body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        ChatRequest {
            // Azure selects the model through the deployment in the URL
            model: match self.config.provider() {
                Provider::OpenAi => Some(&self.config.model),
                Provider::Azure => None,
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "schema": request.schema,
                    "strict": true
                }
            }),
        }
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<Value> {
        let body = self.request_body(request);
        debug!(
            messages = %serde_json::to_string(&body.messages).unwrap_or_default(),
            "Requesting generation"
        );

        let builder = self.client.post(self.endpoint()).json(&body);
        let builder = match self.config.provider() {
            Provider::OpenAi => builder.bearer_auth(self.config.api_key.as_str()),
            Provider::Azure => builder.header("api-key", self.config.api_key.as_str()),
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SpecmockError::Generation(format!(
                "model endpoint returned {}: {}",
                status, text
            )));
        }

        let completion: ChatCompletion = serde_json::from_str(&text).map_err(|e| {
            SpecmockError::Generation(format!("Failed to parse completion: {}", e))
        })?;

        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| SpecmockError::Generation("completion has no choices".to_string()))?;

        if let Some(refusal) = message.refusal {
            return Err(SpecmockError::Generation(format!("model refused: {}", refusal)));
        }

        let content = message
            .content
            .ok_or_else(|| SpecmockError::Generation("completion has no content".to_string()))?;

        serde_json::from_str(&content).map_err(|e| {
            SpecmockError::Generation(format!("completion content is not JSON: {}", e))
        })
    }
}

impl Generator for OpenAiGenerator {
    fn generate(&self, request: &GenerationRequest) -> impl std::future::Future<Output = Result<Value>> + Send {
        self.complete(request)
    }
}
