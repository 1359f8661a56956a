use std::sync::Arc;

use crate::{config::AppConfig, store::MemStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            store: Arc::new(MemStore::new()),
            config: Arc::new(config),
        }
    }
}
