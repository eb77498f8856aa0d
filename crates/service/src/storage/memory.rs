use std::collections::{hash_map::Entry, BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::engine::{BatchResults, ItemKey, KvEngine, ScanRequest};
use crate::errors::StoreError;

/// Insertion-ordered table of one collection.
#[derive(Default, Debug)]
struct Table {
    order: Vec<ItemKey>,
    items: HashMap<ItemKey, Value>,
}

impl Table {
    fn upsert(&mut self, key: ItemKey, item: Value) {
        if self.items.insert(key.clone(), item).is_none() {
            self.order.push(key);
        }
    }

    fn insert_if_absent(&mut self, key: ItemKey, item: Value) -> bool {
        match self.items.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(item);
                true
            }
        }
    }

    fn remove(&mut self, key: &ItemKey) -> bool {
        if self.items.remove(key).is_some() {
            self.order.retain(|k| k != key);
            true
        } else {
            false
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&ItemKey, &Value)> {
        self.order.iter().filter_map(move |k| self.items.get(k).map(|v| (k, v)))
    }
}

/// One stored item as it appears in a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredItem {
    pub key: ItemKey,
    pub item: Value,
}

/// Serializable image of every collection, items in insertion order.
pub type Snapshot = BTreeMap<String, Vec<StoredItem>>;

/// In-process engine. Each collection lives in its own `DashMap` shard entry, so
/// a conditional insert holds that collection's lock for the check and the write.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    tables: Arc<DashMap<String, Table>>,
}

impl MemoryEngine {
    pub fn new() -> Self { Self::default() }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let engine = Self::new();
        for (collection, items) in snapshot {
            let mut table = Table::default();
            for StoredItem { key, item } in items {
                table.upsert(key, item);
            }
            engine.tables.insert(collection, table);
        }
        engine
    }

    pub fn snapshot(&self) -> Snapshot {
        self.tables
            .iter()
            .map(|t| {
                let items = t
                    .value()
                    .iter()
                    .map(|(k, v)| StoredItem { key: k.clone(), item: v.clone() })
                    .collect();
                (t.key().clone(), items)
            })
            .collect()
    }

    pub(crate) fn get_sync(&self, collection: &str, key: &ItemKey) -> Option<Value> {
        self.tables.get(collection).and_then(|t| t.items.get(key).cloned())
    }

    pub(crate) fn put_sync(&self, collection: &str, key: ItemKey, item: Value) {
        self.tables.entry(collection.to_string()).or_default().upsert(key, item);
    }

    pub(crate) fn put_if_absent_sync(&self, collection: &str, key: ItemKey, item: Value) -> bool {
        self.tables.entry(collection.to_string()).or_default().insert_if_absent(key, item)
    }

    pub(crate) fn delete_sync(&self, collection: &str, key: &ItemKey) -> bool {
        self.tables.get_mut(collection).map(|mut t| t.remove(key)).unwrap_or(false)
    }

    pub(crate) fn scan_sync(&self, collection: &str, request: &ScanRequest) -> Vec<Value> {
        self.tables
            .get(collection)
            .map(|t| t.iter().filter_map(|(_, v)| request.apply(v)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn query_sync(&self, collection: &str, partition: &str) -> Vec<Value> {
        self.tables
            .get(collection)
            .map(|t| {
                t.iter()
                    .filter(|(k, _)| k.partition == partition)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl KvEngine for MemoryEngine {
    async fn get(&self, collection: &str, key: &ItemKey) -> Result<Option<Value>, StoreError> {
        Ok(self.get_sync(collection, key))
    }

    async fn put(&self, collection: &str, key: ItemKey, item: Value) -> Result<(), StoreError> {
        self.put_sync(collection, key, item);
        Ok(())
    }

    async fn put_if_absent(&self, collection: &str, key: ItemKey, item: Value) -> Result<bool, StoreError> {
        Ok(self.put_if_absent_sync(collection, key, item))
    }

    async fn delete(&self, collection: &str, key: &ItemKey) -> Result<bool, StoreError> {
        Ok(self.delete_sync(collection, key))
    }

    async fn scan(&self, collection: &str, request: &ScanRequest) -> Result<Vec<Value>, StoreError> {
        Ok(self.scan_sync(collection, request))
    }

    async fn query(&self, collection: &str, partition: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.query_sync(collection, partition))
    }

    async fn batch_put(&self, collection: &str, items: Vec<(ItemKey, Value)>) -> Result<BatchResults, StoreError> {
        Ok(items
            .into_iter()
            .map(|(key, item)| {
                self.put_sync(collection, key, item);
                Ok(())
            })
            .collect())
    }
}
