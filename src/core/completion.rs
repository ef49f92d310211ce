use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::CompletionError;
use crate::models::CompletionConfig;

/// Anything that can turn a (system, user) prompt pair into completion text
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> Result<String, CompletionError>;
}

/// Client for an OpenAI-compatible chat completions API
pub struct CompletionClient {
    client: Client,
    config: CompletionConfig,
    api_key: String,
}

/// Chat message for the chat completions API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Request body for the chat completions endpoint
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionClient {
    /// Create a new client with the given configuration and API key
    pub fn new(config: CompletionConfig, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| CompletionError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config, api_key: api_key.into() })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    /// Request a single completion and return the first choice's content
    async fn complete(&self, system_prompt: &str, prompt: &str) -> Result<String, CompletionError> {
        let url = self.endpoint();
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            n: 1,
        };

        debug!("Sending completion request to {} (model {}, {} chars)", url, self.config.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CompletionError::ConnectionRefused(format!(
                        "Could not connect to completion service at {}",
                        self.config.url
                    ))
                } else if e.is_timeout() {
                    CompletionError::Timeout(self.config.timeout_seconds)
                } else {
                    CompletionError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::HttpError { status, message });
        }

        let body = response.text().await.map_err(CompletionError::from)?;
        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            CompletionError::ParseError(format!("{} - {}", e, preview))
        })?;

        let choice = parsed.choices.into_iter().next().ok_or(CompletionError::EmptyCompletion)?;
        if let Some(reason) = &choice.finish_reason {
            debug!("Completion finished: {}", reason);
        }
        match choice.message.and_then(|m| m.content) {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(CompletionError::EmptyCompletion),
        }
    }
}
