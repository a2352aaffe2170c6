//! Shared application state

use docqa_foundation::rag::RagPipeline;

/// State shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: RagPipeline,
}

impl AppState {
    pub fn new(pipeline: RagPipeline) -> Self {
        Self { pipeline }
    }
}
