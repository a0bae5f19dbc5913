use std::sync::Arc;
use std::time::Instant;

use crate::inference::Pipeline;
use crate::model::ArtifactStatus;

/// Shared by every handler. Everything behind it is built once at startup
/// and never mutated, so no locking is needed.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Pipeline>,
    artifacts: Arc<ArtifactStatus>,
    started_at: Instant,
}

impl AppState {
    pub fn new(pipeline: Pipeline, artifacts: ArtifactStatus) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            artifacts: Arc::new(artifacts),
            started_at: Instant::now(),
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn artifacts(&self) -> &ArtifactStatus {
        &self.artifacts
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
