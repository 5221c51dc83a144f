//! Append-only analytics log.

use crate::database::models::AnalyticsEvent;
use crate::database::models::keys::ANALYTICS;
use crate::database::{Storage, StorageError};

#[derive(Clone)]
pub struct AnalyticsRepository {
    storage: Storage,
}

impl AnalyticsRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub async fn append(&self, event: AnalyticsEvent) -> Result<(), StorageError> {
        self.storage.append(ANALYTICS, &event).await
    }

    /// The whole log, oldest first.
    #[cfg(test)]
    pub async fn events(&self) -> Vec<AnalyticsEvent> {
        self.storage.load_log(ANALYTICS).await.unwrap_or_default()
    }
}
