//! Outline persistence: local files plus best-effort S3 mirroring.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::StorageConfig;
use crate::error::{RelayError, Result};

/// Characters allowed in artifact file names; everything else becomes `_`
static KEY_SANITIZER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9\u{4e00}-\u{9fa5}]").expect("Invalid KEY_SANITIZER"));

/// Replace every character outside ASCII alphanumerics and CJK with `_`.
fn sanitize_topic(topic: &str) -> String {
    KEY_SANITIZER.replace_all(topic, "_").into_owned()
}

/// File name for a generated outline: sanitized topic plus a UTC stamp with
/// `:` and `.` flattened to `-` so the key is filesystem-safe.
pub fn artifact_key(topic: &str, now: DateTime<Utc>) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("mindmap_{}_{}.txt", sanitize_topic(topic), timestamp)
}

/// A persisted outline: always a local file, plus the object URL when the
/// S3 leg succeeded.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub local_path: PathBuf,
    pub key: String,
    pub url: Option<String>,
}

/// Writes generated outlines to a local directory and, when a bucket is
/// configured, mirrors them to S3-compatible object storage.
pub struct ArtifactStore {
    s3: aws_sdk_s3::Client,
    config: StorageConfig,
}

impl ArtifactStore {
    /// Build a store from explicit configuration.
    ///
    /// Credentials flow through the SDK's default provider chain; an
    /// `AWS_S3_ENDPOINT` override switches to path-style addressing for
    /// S3-compatible services.
    pub async fn new(config: StorageConfig) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            s3: aws_sdk_s3::Client::from_conf(builder.build()),
            config,
        }
    }

    /// Build a store from the environment, or `None` when persistence is
    /// off (no `RAMIFY_OUTPUT_DIR`).
    pub async fn from_env() -> Option<Self> {
        let config = StorageConfig::from_env();
        if !config.persistence_enabled() {
            return None;
        }
        Some(Self::new(config).await)
    }

    /// Upload a local file to the configured bucket and return its URL.
    pub async fn upload(&self, local_path: &Path, key: &str) -> Result<String> {
        info!(key = %key, "uploading artifact to S3");

        if !tokio::fs::try_exists(local_path).await.unwrap_or(false) {
            return Err(RelayError::NotFound(local_path.display().to_string()));
        }

        let bucket = self
            .config
            .bucket
            .as_deref()
            .ok_or_else(|| RelayError::Config("AWS_S3_BUCKET not set".to_string()))?;

        let body = ByteStream::from_path(local_path).await.map_err(|e| {
            RelayError::Storage(format!("failed to read {}: {e}", local_path.display()))
        })?;

        self.s3
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                RelayError::Storage(format!("S3 upload failed: {}", DisplayErrorContext(&e)))
            })?;

        let url = self.object_url(bucket, key);
        info!(url = %url, "artifact uploaded");

        Ok(url)
    }

    /// Write an outline under the output directory and mirror it to S3.
    ///
    /// The S3 leg is best-effort: failures are logged and the artifact keeps
    /// its local path. Only the local write can fail the operation.
    pub async fn persist_outline(&self, topic: &str, outline: &str) -> Result<StoredArtifact> {
        let output_dir = self
            .config
            .output_dir
            .as_deref()
            .ok_or_else(|| RelayError::Config("RAMIFY_OUTPUT_DIR not set".to_string()))?;

        tokio::fs::create_dir_all(output_dir).await?;

        let key = artifact_key(topic, Utc::now());
        let local_path = output_dir.join(&key);
        tokio::fs::write(&local_path, outline).await?;

        info!(path = %local_path.display(), "outline saved locally");

        let url = if self.config.bucket.is_some() {
            match self.upload(&local_path, &key).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("S3 upload failed, keeping local copy: {e}");
                    None
                }
            }
        } else {
            debug!("no bucket configured, keeping local copy only");
            None
        };

        Ok(StoredArtifact {
            local_path,
            key,
            url,
        })
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        match &self.config.endpoint {
            Some(endpoint) => {
                format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
            }
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                bucket, self.config.region, key
            ),
        }
    }
}
