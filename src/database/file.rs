//! JSON file document store.
//!
//! Layout: `<dir>/<key>.json`, pretty-printed UTF-8. Writes go to a
//! temporary sibling first and are renamed into place, so a crash never
//! leaves a half-written document behind.
//!
//! Logs live in `<dir>/<log>.jsonl`, one compact JSON record per line,
//! opened in append mode.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::store::{DocumentStore, StorageError};

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the data directory.
    pub async fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!("Using JSON documents in {}", dir.display());
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn log_path(&self, log: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", log))
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let bytes = match fs::read(self.path(key)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::backend(key, e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::corrupt(key, e))
    }

    async fn save(&self, key: &str, document: &Value) -> Result<(), StorageError> {
        let body = serde_json::to_vec_pretty(document).map_err(|e| StorageError::corrupt(key, e))?;

        let target = self.path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        fs::write(&tmp, body)
            .await
            .map_err(|e| StorageError::backend(key, e))?;
        fs::rename(&tmp, &target)
            .await
            .map_err(|e| StorageError::backend(key, e))
    }

    async fn append(&self, log: &str, record: &Value) -> Result<(), StorageError> {
        let mut line = serde_json::to_vec(record).map_err(|e| StorageError::corrupt(log, e))?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(log))
            .await
            .map_err(|e| StorageError::backend(log, e))?;
        file.write_all(&line)
            .await
            .map_err(|e| StorageError::backend(log, e))?;
        file.flush().await.map_err(|e| StorageError::backend(log, e))
    }

    async fn read_log(&self, log: &str) -> Result<Vec<Value>, StorageError> {
        let body = match fs::read_to_string(self.log_path(log)).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::backend(log, e)),
        };

        Ok(body
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    // A torn last line after a crash is the usual cause.
                    warn!("Skipping unreadable line in '{}.jsonl': {}", log, e);
                    None
                }
            })
            .collect())
    }
}
