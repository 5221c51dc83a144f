//! Database module exports.

mod file;
mod memory;
pub mod models;
mod mongo;
mod repository;
mod store;

use std::sync::Arc;

use tracing::info;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use mongo::Database;
pub use repository::{AnalyticsRepository, ContentRepository, ProfileRepository, UsageRepository};
pub use store::{Storage, StorageError};

use crate::config::StorageBackend;

/// Open the configured backend.
///
/// Returns the MongoDB handle as well when one was opened, so it can be
/// shut down cleanly.
pub async fn open(backend: &StorageBackend) -> anyhow::Result<(Storage, Option<Database>)> {
    match backend {
        StorageBackend::File(dir) => {
            let store = FileStore::open(dir).await?;
            Ok((Storage::new(Arc::new(store)), None))
        }
        StorageBackend::Mongo { uri, database } => {
            info!("Connecting to MongoDB...");
            let db = Database::connect(uri, database).await?;
            Ok((Storage::new(Arc::new(db.documents())), Some(db)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; nothing will survive a restart");
            Ok((Storage::new(Arc::new(MemoryStore::new())), None))
        }
    }
}
