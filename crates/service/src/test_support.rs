#![cfg(test)]
use std::sync::Arc;

use async_trait::async_trait;
use configs::{ListingConfig, StorageConfig};
use serde_json::Value;

use crate::countries::{CountryInput, CountryService};
use crate::errors::StoreError;
use crate::listing::ListingService;
use crate::neighbors::{NeighborRepository, NeighborService};
use crate::storage::{BatchResults, ItemKey, KvEngine, MemoryEngine, ScanRequest};
use crate::Services;

/// Services plus direct access to the relation store for assertions.
pub struct TestServices {
    pub countries: CountryService,
    pub neighbors: NeighborService,
    pub listing: ListingService,
    pub links: NeighborRepository,
}

pub fn services_on(engine: Arc<dyn KvEngine>) -> TestServices {
    let storage = StorageConfig::default();
    let Services { countries, neighbors, listing } =
        Services::new(Arc::clone(&engine), &storage, &ListingConfig::default());
    let links = NeighborRepository::new(engine, storage.neighbors_collection);
    TestServices { countries, neighbors, listing, links }
}

pub fn memory_services() -> TestServices { services_on(Arc::new(MemoryEngine::new())) }

pub fn failing_services() -> TestServices { services_on(Arc::new(FailingEngine)) }

pub fn sample_input(name: &str, region: &str, population: u64, area: f64) -> CountryInput {
    CountryInput {
        name: name.to_string(),
        description: format!("{name} description"),
        country_code: Some(name.chars().take(3).collect::<String>().to_uppercase()),
        currency: "Dollar".into(),
        currency_code: Some("USD".into()),
        currency_symbol: Some("$".into()),
        capital: format!("{name} City"),
        region: region.to_string(),
        subregion: format!("Inner {region}"),
        area,
        population,
        map_url: None,
        flag: format!("https://flags.example/{name}.png"),
        neighbors: None,
    }
}

/// Engine that rejects every operation.
pub struct FailingEngine;

fn down() -> StoreError { StoreError::Backend("engine unavailable".into()) }

#[async_trait]
impl KvEngine for FailingEngine {
    async fn get(&self, _: &str, _: &ItemKey) -> Result<Option<Value>, StoreError> { Err(down()) }
    async fn put(&self, _: &str, _: ItemKey, _: Value) -> Result<(), StoreError> { Err(down()) }
    async fn put_if_absent(&self, _: &str, _: ItemKey, _: Value) -> Result<bool, StoreError> { Err(down()) }
    async fn delete(&self, _: &str, _: &ItemKey) -> Result<bool, StoreError> { Err(down()) }
    async fn scan(&self, _: &str, _: &ScanRequest) -> Result<Vec<Value>, StoreError> { Err(down()) }
    async fn query(&self, _: &str, _: &str) -> Result<Vec<Value>, StoreError> { Err(down()) }
    async fn batch_put(&self, _: &str, _: Vec<(ItemKey, Value)>) -> Result<BatchResults, StoreError> { Err(down()) }
}

/// Memory engine whose batch writes fail every second item.
#[derive(Default)]
pub struct FlakyBatchEngine {
    inner: MemoryEngine,
}

#[async_trait]
impl KvEngine for FlakyBatchEngine {
    async fn get(&self, c: &str, k: &ItemKey) -> Result<Option<Value>, StoreError> { self.inner.get(c, k).await }
    async fn put(&self, c: &str, k: ItemKey, v: Value) -> Result<(), StoreError> { self.inner.put(c, k, v).await }
    async fn put_if_absent(&self, c: &str, k: ItemKey, v: Value) -> Result<bool, StoreError> { self.inner.put_if_absent(c, k, v).await }
    async fn delete(&self, c: &str, k: &ItemKey) -> Result<bool, StoreError> { self.inner.delete(c, k).await }
    async fn scan(&self, c: &str, r: &ScanRequest) -> Result<Vec<Value>, StoreError> { self.inner.scan(c, r).await }
    async fn query(&self, c: &str, p: &str) -> Result<Vec<Value>, StoreError> { self.inner.query(c, p).await }

    async fn batch_put(&self, c: &str, items: Vec<(ItemKey, Value)>) -> Result<BatchResults, StoreError> {
        let mut results = Vec::with_capacity(items.len());
        for (idx, (key, item)) in items.into_iter().enumerate() {
            if idx % 2 == 1 {
                results.push(Err(StoreError::Backend("throttled".into())));
            } else {
                results.push(self.inner.put(c, key, item).await);
            }
        }
        Ok(results)
    }
}
