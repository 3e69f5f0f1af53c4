pub mod agent;
pub mod config;
pub mod deepseek;
pub mod error;
pub mod models;
pub mod prompt;
pub mod storage;

// Re-export commonly used types
pub use agent::AgentClient;
pub use config::{AgentConfig, GenerationConfig, StorageConfig};
pub use deepseek::DeepseekClient;
pub use error::{RelayError, Result};
pub use models::{
    BusinessData, BusinessRequest, BusinessResponse, ErrorBody, MindmapRequest, MindmapResponse,
};
pub use prompt::build_mindmap_prompt;
pub use storage::{ArtifactStore, StoredArtifact};
