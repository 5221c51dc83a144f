//! Content repository (code lookup).
//!
//! The `codes` document is maintained out-of-band; this side only reads.
//! Entries are decoded one at a time, so a single hand-edited entry that
//! doesn't fit never hides the others.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::database::Storage;
use crate::database::models::StoredContent;
use crate::database::models::keys::CODES;
use crate::platform::ContentRef;

#[derive(Clone)]
pub struct ContentRepository {
    storage: Storage,
}

impl ContentRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Resolve a code by exact match. The caller trims whitespace.
    pub async fn resolve(&self, code: &str) -> Option<ContentRef> {
        let mut codes: HashMap<String, Value> = self.storage.load_or_default(CODES).await;

        let Some(raw) = codes.remove(code) else {
            debug!("Unknown code {:?}", code);
            return None;
        };
        let entry: StoredContent = match serde_json::from_value(raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Code {:?} has a malformed entry, treating as unknown: {}", code, e);
                return None;
            }
        };

        let content = entry.to_content_ref();
        if content.is_none() {
            warn!("Code {:?} has no file id or URL, treating as unknown", code);
        }
        content
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::database::MemoryStore;

    fn repo(codes: serde_json::Value) -> ContentRepository {
        let store = MemoryStore::new();
        store.insert_raw(CODES, codes);
        ContentRepository::new(Storage::new(Arc::new(store)))
    }

    #[tokio::test]
    async fn test_exact_match_only() {
        let repo = repo(json!({"ABC12": {"remoteUrl": "https://example/v.mp4"}}));

        assert_eq!(
            repo.resolve("ABC12").await,
            Some(ContentRef::RemoteUrl("https://example/v.mp4".into()))
        );
        assert_eq!(repo.resolve("abc12").await, None);
        assert_eq!(repo.resolve("ABC12 ").await, None);
        assert_eq!(repo.resolve("").await, None);
    }

    #[tokio::test]
    async fn test_empty_entry_is_absent() {
        let repo = repo(json!({"X": {}}));
        assert_eq!(repo.resolve("X").await, None);
    }

    #[tokio::test]
    async fn test_malformed_entry_only_hides_itself() {
        let repo = repo(json!({
            "GOOD": "AAA",
            "BAD": 5,
            "NULL": null,
            "BOTH": {"file_id": "x", "inlineFileHandle": "y"},
        }));

        assert_eq!(repo.resolve("GOOD").await, Some(ContentRef::InlineFile("AAA".into())));
        assert_eq!(repo.resolve("BAD").await, None);
        assert_eq!(repo.resolve("NULL").await, None);
        assert_eq!(repo.resolve("BOTH").await, None);
    }

    #[tokio::test]
    async fn test_unreadable_codes_resolve_nothing() {
        let repo = repo(json!("garbage"));
        assert_eq!(repo.resolve("X").await, None);
    }
}
