//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use sitewright_llm::GenerationProvider;
use sitewright_storage::Storage;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (in-memory by default; trait seam for a persistent
    /// engine).
    pub storage: Arc<dyn Storage>,
    /// Generation provider used for enhancement and code generation.
    pub provider: Arc<dyn GenerationProvider>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            storage,
            provider,
            start_time: Instant::now(),
        }
    }
}
