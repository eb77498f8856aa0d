//! Runtime wiring
//!
//! Opens the configured persistence engine once per process and builds the
//! services that share it.

use std::sync::Arc;

use configs::{ListingConfig, StorageBackend, StorageConfig};
use tracing::info;

use crate::countries::{CountryRepository, CountryService};
use crate::listing::ListingService;
use crate::neighbors::{NeighborRepository, NeighborService};
use crate::storage::{JsonFileEngine, KvEngine, MemoryEngine};

/// Open the engine selected by `storage.backend`.
pub async fn open_engine(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn KvEngine>> {
    let engine: Arc<dyn KvEngine> = match cfg.backend {
        StorageBackend::Memory => {
            info!(backend = "memory", "storage_engine_ready");
            Arc::new(MemoryEngine::new())
        }
        StorageBackend::File => {
            common::env::ensure_data_dir(&cfg.data_file).await?;
            let engine: Arc<dyn KvEngine> = JsonFileEngine::open(&cfg.data_file).await?;
            info!(backend = "file", path = %cfg.data_file.display(), "storage_engine_ready");
            engine
        }
    };
    Ok(engine)
}

/// Every service, sharing one engine handle.
#[derive(Clone)]
pub struct Services {
    pub countries: CountryService,
    pub neighbors: NeighborService,
    pub listing: ListingService,
}

impl Services {
    pub fn new(engine: Arc<dyn KvEngine>, storage: &StorageConfig, listing: &ListingConfig) -> Self {
        let countries = CountryRepository::new(Arc::clone(&engine), storage.countries_collection.clone());
        let links = NeighborRepository::new(engine, storage.neighbors_collection.clone());
        Self {
            countries: CountryService::new(countries.clone(), links.clone()),
            neighbors: NeighborService::new(countries.clone(), links),
            listing: ListingService::new(countries, listing.default_limit, listing.max_limit),
        }
    }

    /// In-memory services with default collections and limits.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryEngine::new()), &StorageConfig::default(), &ListingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_backend_opens_under_configured_path() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("country_api_rt_{}", uuid::Uuid::new_v4()));
        let cfg = StorageConfig {
            backend: StorageBackend::File,
            data_file: dir.join("store.json"),
            ..StorageConfig::default()
        };
        let engine = open_engine(&cfg).await?;
        let services = Services::new(engine, &cfg, &ListingConfig::default());
        assert!(services.countries.list().await?.is_empty());
        assert!(tokio::fs::metadata(dir.join("store.json")).await.is_ok());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
