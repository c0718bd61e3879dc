use crate::config::Settings;
use crate::models::Dataset;
use std::sync::Arc;

/// Shared read-only state. Nothing here changes after startup, so handlers
/// never need a lock.
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(dataset: Dataset, settings: Settings) -> Self {
        Self {
            dataset: Arc::new(dataset),
            settings: Arc::new(settings),
        }
    }
}
