//! Shared application state for all routes. Read-only after startup.

use crate::service::{ObjectService, ParamPipeline};
use crate::store::ObjectRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub objects: ObjectService,
    /// Built once; shared by every handler.
    pub pipeline: Arc<ParamPipeline>,
}

impl AppState {
    pub fn new(repo: Arc<dyn ObjectRepository>) -> Self {
        Self::with_pipeline(repo, ParamPipeline::default())
    }

    pub fn with_pipeline(repo: Arc<dyn ObjectRepository>, pipeline: ParamPipeline) -> Self {
        Self {
            objects: ObjectService::new(repo),
            pipeline: Arc::new(pipeline),
        }
    }
}
