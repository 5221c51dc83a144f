//! Download counters (`stats` document).

use std::collections::BTreeMap;

use crate::database::models::keys::STATS;
use crate::database::{Storage, StorageError};

type Counters = BTreeMap<String, u64>;

#[derive(Clone)]
pub struct UsageRepository {
    storage: Storage,
}

impl UsageRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Count one delivered item. Returns the new count.
    ///
    /// Call only after the platform confirmed the send.
    pub async fn record_delivery(&self, code: &str) -> Result<u64, StorageError> {
        self.storage
            .update::<Counters, _, _>(STATS, |counters| {
                let count = counters.entry(code.to_string()).or_insert(0);
                *count += 1;
                *count
            })
            .await
    }

    #[cfg(test)]
    pub async fn count(&self, code: &str) -> u64 {
        self.counters().await.get(code).copied().unwrap_or(0)
    }

    /// Sum of all counters.
    pub async fn total(&self) -> u64 {
        self.counters().await.values().sum()
    }

    /// The `n` most requested codes, count descending, ties by code.
    pub async fn top(&self, n: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> = self.counters().await.into_iter().collect();
        ranked.sort_by(|(code_a, a), (code_b, b)| b.cmp(a).then_with(|| code_a.cmp(code_b)));
        ranked.truncate(n);
        ranked
    }

    async fn counters(&self) -> Counters {
        self.storage.load_or_default(STATS).await
    }
}
