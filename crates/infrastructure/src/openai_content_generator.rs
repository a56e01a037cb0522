//! Chat-completions backed content generator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use contentai_application::{ContentGenerator, GenerationPrompt};
use contentai_core::{AppError, AppResult};

/// Settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    /// Bearer API key.
    pub api_key: String,
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Content generator calling `{base_url}/chat/completions`.
#[derive(Clone)]
pub struct OpenAiContentGenerator {
    http_client: Client,
    settings: OpenAiSettings,
}

impl OpenAiContentGenerator {
    /// Creates a generator for the given settings.
    pub fn new(settings: OpenAiSettings) -> AppResult<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "generation API key must not be empty".to_owned(),
            ));
        }

        let http_client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|error| {
                AppError::Configuration(format!("failed to build generation http client: {error}"))
            })?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ContentGenerator for OpenAiContentGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> AppResult<String> {
        let request = ChatCompletionRequest {
            model: self.settings.model.as_str(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: prompt.system.as_str(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user.as_str(),
                },
            ],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self
            .http_client
            .post(self.completions_url())
            .bearer_auth(self.settings.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("generation request failed: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body.chars().take(512).collect::<String>(), "generation backend rejected request");
            return Err(AppError::Upstream(format!(
                "generation backend returned HTTP {status}"
            )));
        }

        let completion = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|error| {
                AppError::Upstream(format!("failed to parse generation response: {error}"))
            })?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Upstream("generation response had no content".to_owned()))
    }
}
