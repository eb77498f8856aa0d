use std::sync::Arc;

use service::{storage::KvEngine, Services};

/// Shared per-process state: services built once around a single engine handle.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

impl AppState {
    pub fn new(services: Services) -> Self { Self { services } }

    pub fn from_engine(engine: Arc<dyn KvEngine>, cfg: &configs::AppConfig) -> Self {
        Self::new(Services::new(engine, &cfg.storage, &cfg.listing))
    }
}
