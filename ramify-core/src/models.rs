//! Wire shapes shared by the server, the CLI and the integration tests.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate-mindmap`.
///
/// `topic` is optional at the parse level so a missing field produces a
/// validation error envelope rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct MindmapRequest {
    pub topic: Option<String>,
}

/// Success envelope for the mindmap route.
#[derive(Debug, Serialize, Deserialize)]
pub struct MindmapResponse {
    pub success: bool,
    pub data: String,
    pub topic: String,
}

impl MindmapResponse {
    pub fn new(data: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            success: true,
            data: data.into(),
            topic: topic.into(),
        }
    }
}

/// Body of `POST /api/generate-business`.
#[derive(Debug, Deserialize)]
pub struct BusinessRequest {
    pub query: Option<String>,
}

/// Success envelope for the business route.
#[derive(Debug, Serialize, Deserialize)]
pub struct BusinessResponse {
    pub success: bool,
    pub data: BusinessData,
    pub timestamp: String,
}

/// Reshaped agent output. `kind` is always `"text"`; the agent exposes no
/// other content types.
#[derive(Debug, Serialize, Deserialize)]
pub struct BusinessData {
    #[serde(rename = "type")]
    pub kind: String,
    pub result: String,
}

impl BusinessResponse {
    /// Wrap agent text in the success envelope, stamped with the current time.
    pub fn text(result: impl Into<String>) -> Self {
        Self {
            success: true,
            data: BusinessData {
                kind: "text".to_string(),
                result: result.into(),
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Failure envelope shared by every route and status code.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}
