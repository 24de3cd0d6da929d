//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::FullRepository;
use crate::services::{NightSkyCache, NightSkyService, TimeContext};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn FullRepository>,
    pub night_sky: NightSkyService,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        time_context: Arc<TimeContext>,
        cache: Arc<NightSkyCache>,
    ) -> Self {
        Self {
            night_sky: NightSkyService::new(Arc::clone(&repository), time_context, cache),
            repository,
        }
    }
}
