use chrono::{DateTime, Utc};
use std::sync::Arc;
use vlab_core::pipeline::Pipeline;
use vlab_core::service::ActivityService;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ActivityService>,
    pub pipeline: Arc<Pipeline>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire the standard submission pipeline around `service`.
    pub fn new(service: Arc<ActivityService>) -> Self {
        let pipeline = Pipeline::standard(service.clone());
        Self {
            service,
            pipeline: Arc::new(pipeline),
            started_at: Utc::now(),
        }
    }
}
