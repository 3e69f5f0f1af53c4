//! DeepSeek chat-completions client.
//!
//! One non-streaming request per generation. A failed call is a failed
//! operation: no retries, no partial results.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GenerationConfig;
use crate::error::{RelayError, Result};

/// HTTP request timeout in seconds (used by DeepseekClient)
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Temperature for completion sampling
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Token ceiling for a single completion
pub const MAX_COMPLETION_TOKENS: u32 = 2000;

/// Request payload for the chat completions API
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Create a request with a single user message and default sampling.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            temperature: GENERATION_TEMPERATURE,
            max_tokens: MAX_COMPLETION_TOKENS,
        }
    }

    /// Override the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the token ceiling
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// A message in the chat conversation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from the chat completions API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

/// The message content of a completion choice
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

/// Client for the DeepSeek chat-completions API.
///
/// Holds its own connection pool; construct once at startup and share.
pub struct DeepseekClient {
    client: Client,
    config: GenerationConfig,
}

impl DeepseekClient {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("ramify/1.0")
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, config })
    }

    /// Generate a completion for a prompt.
    ///
    /// Returns the first choice's message content. Transport failures,
    /// non-success statuses and unparsable payloads all surface as
    /// `RelayError::Provider`.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let request = ChatRequest::new(&self.config.model, prompt);
        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RelayError::Provider(format!("failed to reach DeepSeek API: {e}")))?;

        let duration_ms = start.elapsed().as_millis();

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                duration_ms = %duration_ms,
                "DeepSeek API error"
            );
            return Err(RelayError::Provider(format!(
                "DeepSeek API error {status}: {text}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Provider(format!("failed to parse DeepSeek response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::Provider("no completion choices in response".to_string()))?
            .message
            .content;

        info!(
            model = %self.config.model,
            duration_ms = %duration_ms,
            "completion received"
        );

        Ok(content)
    }
}
