//! Time-bounded platform calls.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{
    ChannelRef, ChatInfo, ChatPlatform, ContentRef, Keyboard, MemberStatus, MessageId, PlatformError,
};

/// Wraps a platform so no call can block longer than `limit`.
///
/// An elapsed call is reported as [`PlatformError::Timeout`]; the request
/// future is dropped, its eventual outcome is unknown.
pub struct TimeoutPlatform<P> {
    inner: P,
    limit: Duration,
}

impl<P> TimeoutPlatform<P> {
    pub fn new(inner: P, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, call: &'static str, fut: F) -> Result<T, PlatformError>
    where
        F: Future<Output = Result<T, PlatformError>>,
    {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} timed out after {:?}", call, self.limit);
                Err(PlatformError::Timeout(self.limit))
            }
        }
    }
}

#[async_trait]
impl<P: ChatPlatform> ChatPlatform for TimeoutPlatform<P> {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PlatformError> {
        self.bounded("sendMessage", self.inner.send_message(chat_id, text, keyboard))
            .await
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), PlatformError> {
        self.bounded(
            "editMessageText",
            self.inner.edit_message_text(chat_id, message_id, text, keyboard),
        )
        .await
    }

    async fn delete_message(&self, chat_id: i64, message_id: MessageId) -> Result<(), PlatformError> {
        self.bounded("deleteMessage", self.inner.delete_message(chat_id, message_id))
            .await
    }

    async fn send_content(&self, chat_id: i64, content: &ContentRef) -> Result<MessageId, PlatformError> {
        self.bounded("sendVideo", self.inner.send_content(chat_id, content)).await
    }

    async fn get_chat_member(&self, channel: &ChannelRef, user_id: u64) -> Result<MemberStatus, PlatformError> {
        self.bounded("getChatMember", self.inner.get_chat_member(channel, user_id))
            .await
    }

    async fn get_chat(&self, channel: &ChannelRef) -> Result<ChatInfo, PlatformError> {
        self.bounded("getChat", self.inner.get_chat(channel)).await
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), PlatformError> {
        self.bounded(
            "answerCallbackQuery",
            self.inner.answer_callback(callback_id, text, show_alert),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlatform;

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out() {
        let mock = MockPlatform::new();
        mock.set_delay(Duration::from_secs(30));
        let platform = TimeoutPlatform::new(mock.clone(), Duration::from_secs(5));

        let result = platform.send_message(1, "hi", None).await;

        assert_eq!(result, Err(PlatformError::Timeout(Duration::from_secs(5))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_call_passes_through() {
        let mock = MockPlatform::new();
        mock.set_delay(Duration::from_secs(1));
        let platform = TimeoutPlatform::new(mock.clone(), Duration::from_secs(5));

        let id = platform.send_message(1, "hi", None).await.unwrap();

        assert_eq!(mock.sent_texts(1), vec!["hi".to_string()]);
        assert!(id > 0);
    }
}
