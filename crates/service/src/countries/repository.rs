use std::{collections::HashSet, sync::Arc};

use serde_json::Value;

use crate::countries::domain::Country;
use crate::errors::StoreError;
use crate::storage::{BatchResults, ItemKey, KvEngine, ScanFilter, ScanRequest};

/// Attributes matched by free-text search.
pub const SEARCH_ATTRIBUTES: [&str; 3] = ["name", "region", "subregion"];

/// Record store adapter: sole owner of the country collection.
#[derive(Clone)]
pub struct CountryRepository {
    engine: Arc<dyn KvEngine>,
    collection: String,
}

impl CountryRepository {
    pub fn new(engine: Arc<dyn KvEngine>, collection: impl Into<String>) -> Self {
        Self { engine, collection: collection.into() }
    }

    fn key(id: &str) -> ItemKey { ItemKey::partition(id) }

    fn decode(value: Value) -> Result<Country, StoreError> {
        Ok(serde_json::from_value(value)?)
    }

    fn decode_all(values: Vec<Value>) -> Result<Vec<Country>, StoreError> {
        values.into_iter().map(Self::decode).collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Country>, StoreError> {
        self.engine
            .get(&self.collection, &Self::key(id))
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn put(&self, country: &Country) -> Result<(), StoreError> {
        let item = serde_json::to_value(country)?;
        self.engine.put(&self.collection, Self::key(&country.id), item).await
    }

    /// One result per input country, in input order.
    pub async fn batch_put(&self, countries: &[Country]) -> Result<BatchResults, StoreError> {
        let items = countries
            .iter()
            .map(|c| Ok((Self::key(&c.id), serde_json::to_value(c)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        self.engine.batch_put(&self.collection, items).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.engine.delete(&self.collection, &Self::key(id)).await
    }

    pub async fn scan_all(&self) -> Result<Vec<Country>, StoreError> {
        let values = self.engine.scan(&self.collection, &ScanRequest::all()).await?;
        Self::decode_all(values)
    }

    /// Every stored identifier, scanning with an `id` projection.
    pub async fn scan_ids(&self) -> Result<HashSet<String>, StoreError> {
        let values = self
            .engine
            .scan(&self.collection, &ScanRequest::all().project(["id"]))
            .await?;
        Ok(values
            .iter()
            .filter_map(|v| v.get("id").and_then(Value::as_str).map(str::to_owned))
            .collect())
    }

    /// Countries whose name, region or subregion contains `text`, ignoring case.
    pub async fn search(&self, text: &str) -> Result<Vec<Country>, StoreError> {
        let request = ScanRequest::all().filter(ScanFilter::contains_ignore_case(SEARCH_ATTRIBUTES, text));
        let values = self.engine.scan(&self.collection, &request).await?;
        Self::decode_all(values)
    }
}
