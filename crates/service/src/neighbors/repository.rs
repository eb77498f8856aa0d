use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;
use crate::storage::{ItemKey, KvEngine};

/// Directed edge "country lists neighbor". Keyed by (country_id, neighbor_id).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct NeighborLink {
    pub country_id: String,
    pub neighbor_id: String,
    pub created_at: DateTime<Utc>,
}

/// Neighbor relation store: sole owner of the adjacency collection.
///
/// Does not check that either side exists in the country collection.
#[derive(Clone)]
pub struct NeighborRepository {
    engine: Arc<dyn KvEngine>,
    collection: String,
}

impl NeighborRepository {
    pub fn new(engine: Arc<dyn KvEngine>, collection: impl Into<String>) -> Self {
        Self { engine, collection: collection.into() }
    }

    fn key(country_id: &str, neighbor_id: &str) -> ItemKey {
        ItemKey::composite(country_id, neighbor_id)
    }

    fn decode(value: Value) -> Result<NeighborLink, StoreError> {
        Ok(serde_json::from_value(value)?)
    }

    pub async fn get(&self, country_id: &str, neighbor_id: &str) -> Result<Option<NeighborLink>, StoreError> {
        self.engine
            .get(&self.collection, &Self::key(country_id, neighbor_id))
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Insert the pair unless it already exists; `false` means it was present.
    pub async fn insert_if_absent(&self, country_id: &str, neighbor_id: &str) -> Result<bool, StoreError> {
        let link = NeighborLink {
            country_id: country_id.to_string(),
            neighbor_id: neighbor_id.to_string(),
            created_at: Utc::now(),
        };
        let item = serde_json::to_value(&link)?;
        self.engine
            .put_if_absent(&self.collection, Self::key(country_id, neighbor_id), item)
            .await
    }

    /// Every pair with `country_id` on the left, in insertion order.
    pub async fn list_for(&self, country_id: &str) -> Result<Vec<NeighborLink>, StoreError> {
        self.engine
            .query(&self.collection, country_id)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    pub async fn remove(&self, country_id: &str, neighbor_id: &str) -> Result<bool, StoreError> {
        self.engine
            .delete(&self.collection, &Self::key(country_id, neighbor_id))
            .await
    }

    /// Drop the whole partition of `country_id`; returns how many pairs were removed.
    pub async fn remove_all_for(&self, country_id: &str) -> Result<usize, StoreError> {
        let mut removed = 0;
        for link in self.list_for(country_id).await? {
            if self.remove(&link.country_id, &link.neighbor_id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
