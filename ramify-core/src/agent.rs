//! Client for the external business agent.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::config::AgentConfig;
use crate::error::{RelayError, Result};

/// HTTP request timeout in seconds (used by AgentClient)
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Client for the external business agent endpoint.
///
/// The endpoint is optional configuration. The client can always be
/// constructed; calling it without an endpoint is a config error, so the
/// server starts fine when the business route is unused.
pub struct AgentClient {
    client: Client,
    config: AgentConfig,
}

impl AgentClient {
    pub fn new(config: AgentConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("ramify/1.0")
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, config })
    }

    /// Forward a query to the agent and extract its text.
    pub async fn invoke(&self, query: &str) -> Result<String> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| RelayError::Config("BUSINESS_AGENT_URL not set".to_string()))?;

        let start = Instant::now();

        let response = self
            .client
            .post(endpoint)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| RelayError::Provider(format!("failed to reach business agent: {e}")))?;

        let duration_ms = start.elapsed().as_millis();

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                status = %status,
                duration_ms = %duration_ms,
                "business agent error"
            );
            return Err(RelayError::Provider(format!(
                "business agent error {status}: {text}"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| RelayError::Provider(format!("failed to parse agent response: {e}")))?;

        info!(duration_ms = %duration_ms, "agent call completed");

        extract_agent_text(&payload)
    }
}

/// Pull the agent's text out of its response payload.
///
/// The upstream schema is not pinned down, so this is a documented fallback
/// chain rather than a guarantee: the nested chat-completion path wins, a
/// top-level `text` field is the fallback, anything else is malformed.
fn extract_agent_text(payload: &Value) -> Result<String> {
    if let Some(content) = payload
        .pointer("/response/body/choices/0/message/content")
        .and_then(Value::as_str)
    {
        return Ok(content.to_string());
    }

    if let Some(text) = payload.get("text").and_then(Value::as_str) {
        return Ok(text.to_string());
    }

    Err(RelayError::Provider(
        "malformed agent payload: no text content".to_string(),
    ))
}
