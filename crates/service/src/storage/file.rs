use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};

use super::engine::{BatchResults, ItemKey, KvEngine, ScanRequest};
use super::memory::{MemoryEngine, Snapshot};
use crate::errors::StoreError;

/// JSON file-backed engine.
///
/// Serves reads from an in-memory image and rewrites the whole snapshot file
/// after every mutation; the in-memory image only changes once the file
/// write succeeded. Intended for small catalogues where a database is overkill.
pub struct JsonFileEngine {
    memory: MemoryEngine,
    file_path: PathBuf,
    // serializes mutate+persist so snapshots land in mutation order
    write_lock: Mutex<()>,
}

impl JsonFileEngine {
    /// Open the store at `path`. Creates the file with an empty snapshot if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let snapshot: Snapshot = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Snapshot::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = Snapshot::new();
                fs::write(&file_path, serde_json::to_vec(&empty)?).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };
        info!(path = %file_path.display(), collections = snapshot.len(), "json_file_engine_opened");

        Ok(Arc::new(Self {
            memory: MemoryEngine::from_snapshot(snapshot),
            file_path,
            write_lock: Mutex::new(()),
        }))
    }

    /// Write `snapshot` to disk. Caller must hold `write_lock`.
    async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, &self.file_path).await?;
        debug!(path = %self.file_path.display(), "snapshot_saved");
        Ok(())
    }

    /// Apply `mutate` to a staged copy, persist the copy, then apply it to the live image.
    /// A failed save leaves the live image untouched.
    async fn commit<T, F>(&self, mutate: F) -> Result<T, StoreError>
    where
        F: Fn(&MemoryEngine) -> T + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let staged = MemoryEngine::from_snapshot(self.memory.snapshot());
        mutate(&staged);
        if let Err(e) = self.save(&staged.snapshot()).await {
            warn!(path = %self.file_path.display(), err = %e, "snapshot_save_failed");
            return Err(e);
        }
        Ok(mutate(&self.memory))
    }
}

#[async_trait]
impl KvEngine for JsonFileEngine {
    async fn get(&self, collection: &str, key: &ItemKey) -> Result<Option<Value>, StoreError> {
        Ok(self.memory.get_sync(collection, key))
    }

    async fn put(&self, collection: &str, key: ItemKey, item: Value) -> Result<(), StoreError> {
        self.commit(|m| m.put_sync(collection, key.clone(), item.clone())).await
    }

    async fn put_if_absent(&self, collection: &str, key: ItemKey, item: Value) -> Result<bool, StoreError> {
        // present keys never touch the disk
        if self.memory.get_sync(collection, &key).is_some() {
            return Ok(false);
        }
        self.commit(|m| m.put_if_absent_sync(collection, key.clone(), item.clone())).await
    }

    async fn delete(&self, collection: &str, key: &ItemKey) -> Result<bool, StoreError> {
        if self.memory.get_sync(collection, key).is_none() {
            return Ok(false);
        }
        self.commit(|m| m.delete_sync(collection, key)).await
    }

    async fn scan(&self, collection: &str, request: &ScanRequest) -> Result<Vec<Value>, StoreError> {
        Ok(self.memory.scan_sync(collection, request))
    }

    async fn query(&self, collection: &str, partition: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.memory.query_sync(collection, partition))
    }

    async fn batch_put(&self, collection: &str, items: Vec<(ItemKey, Value)>) -> Result<BatchResults, StoreError> {
        let count = items.len();
        self.commit(|m| {
            for (key, item) in &items {
                m.put_sync(collection, key.clone(), item.clone());
            }
        })
        .await?;
        Ok((0..count).map(|_| Ok(())).collect())
    }
}
