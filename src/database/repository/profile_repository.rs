//! User profile repository.
//!
//! Owns the `users` document. Reads degrade to defaults when the document
//! can't be loaded; writes go through [`Storage::update`] and fail as a whole.

use tracing::{debug, warn};

use crate::database::models::keys::USERS;
use crate::database::models::{DEFAULT_LANGUAGE, ProfileBook, UserProfile};
use crate::database::{Storage, StorageError};

/// Per-user language, feedback flag and live message.
#[derive(Clone)]
pub struct ProfileRepository {
    storage: Storage,
}

impl ProfileRepository {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    async fn read(&self, user_id: u64) -> Option<UserProfile> {
        self.storage.load_or_default::<ProfileBook>(USERS).await.get(user_id)
    }

    async fn write<R>(
        &self,
        user_id: u64,
        mutate: impl FnOnce(&mut UserProfile) -> R,
    ) -> Result<R, StorageError> {
        self.storage
            .update::<ProfileBook, _, _>(USERS, |book| mutate(book.entry(user_id)))
            .await
    }

    /// Get a user's language, persisting the default for unseen users.
    ///
    /// An unreadable `users` document can't take the new profile; the user
    /// then gets the default language and nothing is written.
    pub async fn get_language(&self, user_id: u64) -> Result<String, StorageError> {
        if let Some(profile) = self.read(user_id).await {
            return Ok(profile.language);
        }

        debug!("First interaction from user {}", user_id);
        match self.write(user_id, |profile| profile.language.clone()).await {
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!("Profile of user {} not stored: {}", user_id, e);
                Ok(DEFAULT_LANGUAGE.to_string())
            }
            result => result,
        }
    }

    pub async fn set_language(&self, user_id: u64, language: &str) -> Result<(), StorageError> {
        self.write(user_id, |profile| profile.language = language.to_string())
            .await
    }

    pub async fn get_feedback_flag(&self, user_id: u64) -> bool {
        self.read(user_id)
            .await
            .map(|p| p.awaiting_feedback)
            .unwrap_or(false)
    }

    pub async fn set_feedback_flag(&self, user_id: u64, awaiting: bool) -> Result<(), StorageError> {
        self.write(user_id, |profile| profile.awaiting_feedback = awaiting)
            .await
    }

    pub async fn get_last_message_id(&self, user_id: u64) -> Option<i32> {
        self.read(user_id).await.and_then(|p| p.last_message_id)
    }

    pub async fn set_last_message_id(&self, user_id: u64, message_id: i32) -> Result<(), StorageError> {
        self.write(user_id, |profile| profile.last_message_id = Some(message_id))
            .await
    }

    /// Number of users ever seen.
    pub async fn known_users(&self) -> usize {
        self.storage.load_or_default::<ProfileBook>(USERS).await.len()
    }

    /// Language without side effects; default when unknown or unreadable.
    pub async fn peek_language(&self, user_id: u64) -> String {
        self.read(user_id)
            .await
            .map(|p| p.language)
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::database::MemoryStore;

    fn repo() -> (ProfileRepository, MemoryStore) {
        let store = MemoryStore::new();
        let repo = ProfileRepository::new(Storage::new(Arc::new(store.clone())));
        (repo, store)
    }

    #[tokio::test]
    async fn test_unseen_user_gets_persisted_default() {
        let (repo, store) = repo();

        assert_eq!(repo.get_language(10).await.unwrap(), "en");
        assert_eq!(store.raw(USERS), Some(json!({"10": {"language": "en", "awaiting_feedback": false}})));

        // second read doesn't write again
        repo.get_language(10).await.unwrap();
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_fields_are_independent() {
        let (repo, _) = repo();

        repo.set_language(1, "ru").await.unwrap();
        repo.set_feedback_flag(1, true).await.unwrap();
        repo.set_last_message_id(1, 77).await.unwrap();

        assert_eq!(repo.get_language(1).await.unwrap(), "ru");
        assert!(repo.get_feedback_flag(1).await);
        assert_eq!(repo.get_last_message_id(1).await, Some(77));
        assert!(!repo.get_feedback_flag(2).await);
        assert_eq!(repo.known_users().await, 1);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_trace() {
        let (repo, store) = repo();
        repo.set_language(1, "uz").await.unwrap();

        store.fail_saves(true);
        assert!(repo.set_language(1, "ru").await.is_err());
        assert!(repo.set_feedback_flag(1, true).await.is_err());

        assert_eq!(repo.peek_language(1).await, "uz");
        assert!(!repo.get_feedback_flag(1).await);
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let store = MemoryStore::new();
        ProfileRepository::new(Storage::new(Arc::new(store.clone())))
            .set_feedback_flag(5, true)
            .await
            .unwrap();

        let restarted = ProfileRepository::new(Storage::new(Arc::new(store)));
        assert!(restarted.get_feedback_flag(5).await);
    }

    #[tokio::test]
    async fn test_corrupt_users_document_falls_back_to_default_language() {
        let (repo, store) = repo();
        store.insert_raw(USERS, json!({"1": 5}));

        assert_eq!(repo.get_language(42).await.unwrap(), "en");
        assert_eq!(store.raw(USERS), Some(json!({"1": 5})));
        assert_eq!(store.save_count(), 0);

        // plain backend failures are still reported
        let failing = MemoryStore::new();
        failing.fail_saves(true);
        let repo = ProfileRepository::new(Storage::new(Arc::new(failing)));
        assert!(matches!(repo.get_language(42).await, Err(StorageError::Backend { .. })));
    }
}
