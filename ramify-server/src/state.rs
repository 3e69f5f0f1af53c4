//! Shared application state.

use std::sync::Arc;

use ramify_core::{AgentClient, ArtifactStore, DeepseekClient};

/// Dependency-injected clients, constructed once at startup and cloned
/// cheaply into handlers. Nothing here is mutable after construction.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<DeepseekClient>,
    pub agent: Arc<AgentClient>,
    /// Present only when artifact persistence is configured.
    pub store: Option<Arc<ArtifactStore>>,
}

impl AppState {
    pub fn new(
        generator: DeepseekClient,
        agent: AgentClient,
        store: Option<ArtifactStore>,
    ) -> Self {
        Self {
            generator: Arc::new(generator),
            agent: Arc::new(agent),
            store: store.map(Arc::new),
        }
    }
}
