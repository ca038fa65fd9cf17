use std::sync::Arc;

use crate::config::AppConfig;
use crate::domain::repositories::Stores;
use crate::services::Services;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(stores: Stores, config: AppConfig) -> Self {
        Self {
            services: Services::new(stores, config.default_budget),
            config: Arc::new(config),
        }
    }
}
