//! OpenRouter-compatible chat-completions provider

use crate::{CompletionProvider, LlmConfig, LlmError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Chat-completions client for OpenRouter-compatible APIs
///
/// One request per completion: system + user message, low temperature, a
/// `json_object` response-format hint, and the fixed timeout from
/// [`LlmConfig`]. Retries are the caller's business — wrap calls in a
/// [`crate::RetryPolicy`].
pub struct OpenRouterProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl OpenRouterProvider {
    /// Create a provider from its configuration
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap();
        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature: self.config.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let started = Instant::now();
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from_transport)?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "model API returned an error");
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("response carried no choices".to_string()))?
            .message
            .content
            .trim()
            .to_string();

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            model = %self.config.model,
            "model call complete"
        );
        Ok(content)
    }
}
