//! OpenAI chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerationClient, ResponseFormat};
use crate::config::OpenAiConfig;
use crate::error::{AgentError, AgentResult};

/// Chat completions request body.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormatBody>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Chat completions response (only fields we need).
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> AgentResult<Self> {
        if config.api_key.is_empty() {
            return Err(AgentError::Configuration(
                "OpenAI client requires an API key".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    async fn generate(
        &self,
        system: &str,
        user: &str,
        format: ResponseFormat,
    ) -> AgentResult<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: match format {
                ResponseFormat::Json => Some(ResponseFormatBody {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
        };

        tracing::debug!(model = %self.config.model, ?format, "calling chat completions");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "chat completions request failed");
                AgentError::GenerationUnavailable(format!("LLM call failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "chat completions returned non-2xx");
            return Err(AgentError::GenerationUnavailable(format!(
                "LLM call failed with status {status}"
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            AgentError::GenerationUnavailable(format!("unreadable completion envelope: {e}"))
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AgentError::GenerationUnavailable("completion had no content".into()))
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
