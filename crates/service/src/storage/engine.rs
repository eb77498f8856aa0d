use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;

/// Address of an item within a collection: a partition key plus an optional sort key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    pub partition: String,
    #[serde(default)]
    pub sort: Option<String>,
}

impl ItemKey {
    pub fn partition(partition: impl Into<String>) -> Self {
        Self { partition: partition.into(), sort: None }
    }

    pub fn composite(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        Self { partition: partition.into(), sort: Some(sort.into()) }
    }
}

/// Server-side scan filter.
#[derive(Clone, Debug, PartialEq)]
pub enum ScanFilter {
    /// Keep items where any of the named string attributes contains `needle`,
    /// ignoring case. `needle` is stored lowercased.
    ContainsIgnoreCase { attributes: Vec<String>, needle: String },
}

impl ScanFilter {
    pub fn contains_ignore_case<I, S>(attributes: I, needle: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ContainsIgnoreCase {
            attributes: attributes.into_iter().map(Into::into).collect(),
            needle: needle.to_lowercase(),
        }
    }

    pub fn matches(&self, item: &Value) -> bool {
        match self {
            ScanFilter::ContainsIgnoreCase { attributes, needle } => attributes.iter().any(|attr| {
                item.get(attr)
                    .and_then(Value::as_str)
                    .map(|s| s.to_lowercase().contains(needle.as_str()))
                    .unwrap_or(false)
            }),
        }
    }
}

/// Parameters of a full-collection scan.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScanRequest {
    /// Top-level attributes to keep; `None` returns whole items.
    pub projection: Option<Vec<String>>,
    pub filter: Option<ScanFilter>,
}

impl ScanRequest {
    pub fn all() -> Self { Self::default() }

    pub fn project<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(attributes.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, filter: ScanFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Filter first, then project. Returns `None` when the item is filtered out.
    pub fn apply(&self, item: &Value) -> Option<Value> {
        if let Some(filter) = &self.filter {
            if !filter.matches(item) {
                return None;
            }
        }
        match (&self.projection, item) {
            (Some(attrs), Value::Object(map)) => {
                let projected = attrs
                    .iter()
                    .filter_map(|a| map.get(a).map(|v| (a.clone(), v.clone())))
                    .collect::<serde_json::Map<_, _>>();
                Some(Value::Object(projected))
            }
            _ => Some(item.clone()),
        }
    }
}

/// Per-item outcome of a batch write; the outer `Result` covers whole-call failures.
pub type BatchResults = Vec<Result<(), StoreError>>;

/// Persistence engine used by the store adapters.
///
/// Scans and partition queries return items in first-insertion order; an upsert
/// of an existing key keeps its original position.
#[async_trait]
pub trait KvEngine: Send + Sync {
    async fn get(&self, collection: &str, key: &ItemKey) -> Result<Option<Value>, StoreError>;

    /// Insert or replace.
    async fn put(&self, collection: &str, key: ItemKey, item: Value) -> Result<(), StoreError>;

    /// Atomic conditional insert; `false` when the key is already present.
    async fn put_if_absent(&self, collection: &str, key: ItemKey, item: Value) -> Result<bool, StoreError>;

    /// Remove a key; returns whether it existed.
    async fn delete(&self, collection: &str, key: &ItemKey) -> Result<bool, StoreError>;

    async fn scan(&self, collection: &str, request: &ScanRequest) -> Result<Vec<Value>, StoreError>;

    /// Every item whose partition key equals `partition`.
    async fn query(&self, collection: &str, partition: &str) -> Result<Vec<Value>, StoreError>;

    /// Independent puts; one item failing does not roll back the others.
    async fn batch_put(&self, collection: &str, items: Vec<(ItemKey, Value)>) -> Result<BatchResults, StoreError>;
}
