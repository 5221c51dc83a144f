//! Document store abstraction.
//!
//! Persistence is a handful of named JSON documents (`users`, `codes`,
//! `stats`) plus append-only logs (`analytics`). Backends load and save a
//! whole document, or append a single record to a log; [`Storage`] adds
//! typed access and serializes every load-mutate-save sequence per
//! document.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::utils::KeyedLocks;

/// Failures of the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The document exists but can't be decoded.
    #[error("document '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },

    /// The backend itself failed (I/O, network, driver).
    #[error("storage backend failed for '{key}': {reason}")]
    Backend { key: String, reason: String },
}

impl StorageError {
    pub fn corrupt(key: &str, reason: impl ToString) -> Self {
        Self::Corrupt {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn backend(key: &str, reason: impl ToString) -> Self {
        Self::Backend {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A backend holding whole JSON documents by name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load a document. `Ok(None)` means it was never written.
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace a document.
    async fn save(&self, key: &str, document: &Value) -> Result<(), StorageError>;

    /// Add one record to the end of a log. Cost does not grow with the log.
    async fn append(&self, log: &str, record: &Value) -> Result<(), StorageError>;

    /// Every record of a log, oldest first.
    async fn read_log(&self, log: &str) -> Result<Vec<Value>, StorageError>;
}

/// Typed, serialized access to a [`DocumentStore`].
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn DocumentStore>,
    locks: Arc<KeyedLocks<String>>,
}

impl Storage {
    pub fn new(backend: Arc<dyn DocumentStore>) -> Self {
        Self {
            backend,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Load and decode a document, without degrading.
    pub async fn try_load<T>(&self, key: &str) -> Result<Option<T>, StorageError>
    where
        T: DeserializeOwned,
    {
        match self.backend.load(key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StorageError::corrupt(key, e)),
            None => Ok(None),
        }
    }

    /// Load a document, degrading to `T::default()`.
    ///
    /// A missing document is the normal first-run case and is silent; a
    /// corrupt document or a failing backend is logged.
    pub async fn load_or_default<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.try_load(key).await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!("Document '{}' not found, using default", key);
                T::default()
            }
            Err(e) => {
                warn!("{}; continuing with an empty default", e);
                T::default()
            }
        }
    }

    /// Load, mutate and save a document as one exclusive step.
    ///
    /// The document is only written when `mutate` actually changed it.
    /// Unlike [`Storage::load_or_default`], a corrupt or unreadable document
    /// is an error here: saving a default over it would destroy its data.
    pub async fn update<T, R, F>(&self, key: &str, mutate: F) -> Result<R, StorageError>
    where
        T: DeserializeOwned + Serialize + Default + Clone + PartialEq,
        F: FnOnce(&mut T) -> R,
    {
        let _guard = self.locks.lock(key.to_string()).await;

        let before: T = self.try_load(key).await?.unwrap_or_default();
        let mut doc = before.clone();
        let result = mutate(&mut doc);

        if doc != before {
            let value = serde_json::to_value(&doc).map_err(|e| StorageError::corrupt(key, e))?;
            self.backend.save(key, &value).await?;
            debug!("Saved document '{}'", key);
        }

        Ok(result)
    }

    /// Append one record to a log.
    pub async fn append<T: Serialize>(&self, log: &str, record: &T) -> Result<(), StorageError> {
        let value = serde_json::to_value(record).map_err(|e| StorageError::corrupt(log, e))?;

        let _guard = self.locks.lock(log.to_string()).await;
        self.backend.append(log, &value).await
    }

    /// Read a log, skipping records that no longer decode.
    #[cfg(test)]
    pub async fn load_log<T: DeserializeOwned>(&self, log: &str) -> Result<Vec<T>, StorageError> {
        let records = self.backend.read_log(log).await?;

        Ok(records
            .into_iter()
            .filter_map(|record| match serde_json::from_value(record) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping bad record in log '{}': {}", log, e);
                    None
                }
            })
            .collect())
    }
}
