//! Storage abstractions for service layer
//!
//! `KvEngine` is the persistence-engine seam: a key/document store with
//! get/put/delete, conditional insert, partition query and unindexed scan.
//! Two engines are provided: an in-process map and a JSON-snapshot file store.

pub mod engine;
pub mod file;
pub mod memory;

pub use engine::{BatchResults, ItemKey, KvEngine, ScanFilter, ScanRequest};
pub use file::JsonFileEngine;
pub use memory::MemoryEngine;
