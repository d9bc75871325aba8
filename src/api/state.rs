use std::sync::Arc;

use crate::services::{PipelineSettings, RecommendationPipeline};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RecommendationPipeline>,
    /// Settings used for anything a request does not override
    pub defaults: PipelineSettings,
}

impl AppState {
    pub fn new(pipeline: RecommendationPipeline, defaults: PipelineSettings) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            defaults,
        }
    }
}
