//! Shared application state

use std::sync::Arc;

use crate::review::ReviewCoordinator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Review orchestration over history and the reviewer service
    pub coordinator: Arc<ReviewCoordinator>,
    /// Ollama URL, reported by the health check
    pub ollama_url: String,
}

impl AppState {
    /// Create new app state
    pub fn new(coordinator: ReviewCoordinator, ollama_url: impl Into<String>) -> Self {
        Self {
            coordinator: Arc::new(coordinator),
            ollama_url: ollama_url.into(),
        }
    }

    /// Model name of the reviewer service
    pub fn model(&self) -> &str {
        self.coordinator.model()
    }
}
