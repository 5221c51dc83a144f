//! In-process document store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::store::{DocumentStore, StorageError};

/// Keeps documents in memory. Nothing survives a restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<String, Value>>>,
    logs: Arc<RwLock<HashMap<String, Vec<Value>>>>,
    fail_saves: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a document in place without going through [`Storage`](super::Storage).
    #[cfg(test)]
    pub fn insert_raw(&self, key: &str, document: Value) {
        self.documents.write().insert(key.to_string(), document);
    }

    pub fn raw(&self, key: &str) -> Option<Value> {
        self.documents.read().get(key).cloned()
    }

    /// Records appended to a log so far.
    #[cfg(test)]
    pub fn log(&self, log: &str) -> Vec<Value> {
        self.logs.read().get(log).cloned().unwrap_or_default()
    }

    /// Make every subsequent save and append fail.
    #[cfg(test)]
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    #[cfg(test)]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.raw(key))
    }

    async fn save(&self, key: &str, document: &Value) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::backend(key, "saves are disabled"));
        }
        self.documents.write().insert(key.to_string(), document.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn append(&self, log: &str, record: &Value) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::backend(log, "saves are disabled"));
        }
        self.logs
            .write()
            .entry(log.to_string())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn read_log(&self, log: &str) -> Result<Vec<Value>, StorageError> {
        Ok(self.logs.read().get(log).cloned().unwrap_or_default())
    }
}
