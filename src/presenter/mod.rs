//! Message presenter.
//!
//! Every user sees at most one "live" bot message: presenting a new one
//! deletes the previous first. The live message id is stored in the user's
//! profile so the behavior survives restarts.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::database::ProfileRepository;
use crate::platform::{ChatPlatform, Keyboard, MessageId, PlatformError};

#[derive(Clone)]
pub struct MessagePresenter {
    platform: Arc<dyn ChatPlatform>,
    profiles: ProfileRepository,
}

impl MessagePresenter {
    pub fn new(platform: Arc<dyn ChatPlatform>, profiles: ProfileRepository) -> Self {
        Self { platform, profiles }
    }

    /// Replace the user's live message with a new one.
    ///
    /// Deleting the old message is best-effort; it may already be gone or
    /// be too old to delete. The new id is recorded either way.
    pub async fn present_to(
        &self,
        user_id: u64,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PlatformError> {
        if let Some(previous) = self.profiles.get_last_message_id(user_id).await
            && let Err(e) = self.platform.delete_message(chat_id, previous).await
        {
            debug!("Could not delete previous message {} for user {}: {}", previous, user_id, e);
        }

        let message_id = self.platform.send_message(chat_id, text, keyboard).await?;
        self.remember(user_id, message_id).await;
        Ok(message_id)
    }

    /// Rewrite a bot message the user just interacted with.
    ///
    /// Falls back to [`MessagePresenter::present_to`] if the edit fails.
    pub async fn present_in_place(
        &self,
        user_id: u64,
        chat_id: i64,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PlatformError> {
        match self
            .platform
            .edit_message_text(chat_id, message_id, text, keyboard)
            .await
        {
            Ok(()) => {
                self.remember(user_id, message_id).await;
                Ok(message_id)
            }
            Err(e) => {
                debug!("Edit of message {} failed ({}), sending a new one", message_id, e);
                self.present_to(user_id, chat_id, text, keyboard).await
            }
        }
    }

    // The message is already on screen; losing its id only means the next
    // presentation can't delete it.
    async fn remember(&self, user_id: u64, message_id: MessageId) {
        if let Err(e) = self.profiles.set_last_message_id(user_id, message_id).await {
            warn!("Failed to record live message for user {}: {}", user_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{MemoryStore, Storage};
    use crate::testing::MockPlatform;

    fn presenter(mock: &MockPlatform) -> (MessagePresenter, ProfileRepository) {
        let profiles = ProfileRepository::new(Storage::new(Arc::new(MemoryStore::new())));
        (MessagePresenter::new(Arc::new(mock.clone()), profiles.clone()), profiles)
    }

    #[tokio::test]
    async fn test_replaces_previous_message() {
        let mock = MockPlatform::new();
        let (presenter, profiles) = presenter(&mock);

        let first = presenter.present_to(1, 1, "one", None).await.unwrap();
        let second = presenter.present_to(1, 1, "two", None).await.unwrap();

        assert_eq!(mock.deleted(), vec![(1, first)]);
        assert_eq!(profiles.get_last_message_id(1).await, Some(second));
    }

    #[tokio::test]
    async fn test_failed_delete_still_records_new_message() {
        let mock = MockPlatform::new();
        let (presenter, profiles) = presenter(&mock);
        profiles.set_last_message_id(1, 999).await.unwrap();
        mock.fail_deletes(true);

        let id = presenter.present_to(1, 1, "hello", None).await.unwrap();

        assert_eq!(mock.sent_texts(1), vec!["hello".to_string()]);
        assert_eq!(profiles.get_last_message_id(1).await, Some(id));
    }

    #[tokio::test]
    async fn test_failed_send_keeps_old_record() {
        let mock = MockPlatform::new();
        let (presenter, profiles) = presenter(&mock);
        profiles.set_last_message_id(1, 5).await.unwrap();
        mock.fail_sends_to(1, true);

        assert!(presenter.present_to(1, 1, "hello", None).await.is_err());
        assert_eq!(profiles.get_last_message_id(1).await, Some(5));
    }

    #[tokio::test]
    async fn test_in_place_edit_and_fallback() {
        let mock = MockPlatform::new();
        let (presenter, profiles) = presenter(&mock);

        let id = presenter.present_in_place(1, 1, 40, "edited", None).await.unwrap();
        assert_eq!(id, 40);
        assert_eq!(mock.edits(), vec![(1, 40, "edited".to_string())]);
        assert_eq!(profiles.get_last_message_id(1).await, Some(40));

        mock.fail_edits(true);
        let id = presenter.present_in_place(1, 1, 40, "again", None).await.unwrap();
        assert_ne!(id, 40);
        assert_eq!(mock.sent_texts(1), vec!["again".to_string()]);
    }
}
