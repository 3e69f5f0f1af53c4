//! Environment-backed configuration, loaded once at process start.

use std::path::PathBuf;

use crate::error::{RelayError, Result};

/// Default chat-completions base URL when DEEPSEEK_BASE_URL env var is not set
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Default model used when DEEPSEEK_MODEL env var is not set
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default region for public object URLs when AWS_S3_REGION env var is not set
pub const DEFAULT_S3_REGION: &str = "us-east-1";

/// Read an env var, treating blank values as unset.
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Credentials and endpoint for the generation provider.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GenerationConfig {
    /// Load configuration from the .env file and environment.
    ///
    /// Fails when DEEPSEEK_API_KEY is absent; the server treats that as fatal
    /// at startup.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // not an error if .env is absent

        let api_key = env_opt("DEEPSEEK_API_KEY")
            .ok_or_else(|| RelayError::Config("DEEPSEEK_API_KEY not set".to_string()))?;

        let model = env_opt("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = env_opt("DEEPSEEK_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            api_key,
            model,
            base_url,
        })
    }

    /// Build a configuration without touching the environment.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: base_url.into(),
        }
    }

    /// API key with everything but the last six characters masked, for logs.
    pub fn masked_key(&self) -> String {
        let chars = self.api_key.chars().count();
        let tail: String = self
            .api_key
            .chars()
            .skip(chars.saturating_sub(6))
            .collect();
        format!("******{tail}")
    }
}

/// Endpoint of the external business agent. Optional: the server starts
/// without it and the business route answers with a config error instead.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub endpoint: Option<String>,
}

impl AgentConfig {
    pub fn from_env() -> Self {
        Self {
            endpoint: env_opt("BUSINESS_AGENT_URL"),
        }
    }

    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
        }
    }
}

/// Where generated outlines are persisted. Persistence is off unless
/// RAMIFY_OUTPUT_DIR is set; the S3 side additionally needs a bucket.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub output_dir: Option<PathBuf>,
    pub bucket: Option<String>,
    pub region: String,
    pub endpoint: Option<String>,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self {
            output_dir: env_opt("RAMIFY_OUTPUT_DIR").map(PathBuf::from),
            bucket: env_opt("AWS_S3_BUCKET"),
            region: env_opt("AWS_S3_REGION").unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            endpoint: env_opt("AWS_S3_ENDPOINT"),
        }
    }

    /// Whether the optional persistence step is switched on.
    pub fn persistence_enabled(&self) -> bool {
        self.output_dir.is_some()
    }
}
