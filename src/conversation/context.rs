//! Services shared by all handlers, and the per-update view on them.

use std::sync::Arc;

use tracing::warn;

use super::update::{IncomingUpdate, Sender};
use crate::analytics::AnalyticsRecorder;
use crate::database::{ContentRepository, ProfileRepository, UsageRepository};
use crate::i18n::Translations;
use crate::platform::{ChatPlatform, Keyboard, MessageId, PlatformError};
use crate::presenter::MessagePresenter;
use crate::subscription::SubscriptionGate;

/// Conversation state, derived from the stored profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserState {
    Normal,
    AwaitingFeedback,
}

pub struct Services {
    pub platform: Arc<dyn ChatPlatform>,
    pub profiles: ProfileRepository,
    pub content: ContentRepository,
    pub usage: UsageRepository,
    pub analytics: AnalyticsRecorder,
    pub gate: SubscriptionGate,
    pub presenter: MessagePresenter,
    pub translations: Arc<Translations>,
    pub operator_id: Option<u64>,
    pub stats_top_n: usize,
}

impl Services {
    pub async fn user_state(&self, user_id: u64) -> UserState {
        if self.profiles.get_feedback_flag(user_id).await {
            UserState::AwaitingFeedback
        } else {
            UserState::Normal
        }
    }
}

/// What a handler sees: the services plus the update being handled.
pub struct Context<'a> {
    pub services: &'a Services,
    pub update: &'a IncomingUpdate,
}

impl Context<'_> {
    pub fn user_id(&self) -> u64 {
        self.update.sender.id
    }

    pub fn chat_id(&self) -> i64 {
        self.update.chat_id
    }

    pub fn sender(&self) -> &Sender {
        &self.update.sender
    }

    pub fn is_operator(&self) -> bool {
        self.services.operator_id == Some(self.user_id())
    }

    /// The sender's language, creating their profile on first contact.
    ///
    /// Storage trouble only costs the profile, never the update.
    pub async fn language(&self) -> String {
        match self.services.profiles.get_language(self.user_id()).await {
            Ok(lang) => lang,
            Err(e) => {
                warn!("Language of user {} unavailable: {}", self.user_id(), e);
                self.services.profiles.peek_language(self.user_id()).await
            }
        }
    }

    pub fn text(&self, lang: &str, key: &str) -> String {
        self.services.translations.get_text(lang, key)
    }

    pub fn welcome(&self, lang: &str) -> String {
        self.text(lang, "welcome")
            .replace("{name}", &self.sender().display_name)
    }

    pub async fn present(&self, text: &str, keyboard: Option<&Keyboard>) -> Result<MessageId, PlatformError> {
        self.services
            .presenter
            .present_to(self.user_id(), self.chat_id(), text, keyboard)
            .await
    }

    /// Edit the message a button was pressed on, or present a new one.
    pub async fn present_on(
        &self,
        message_id: Option<MessageId>,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PlatformError> {
        match message_id {
            Some(message_id) => {
                self.services
                    .presenter
                    .present_in_place(self.user_id(), self.chat_id(), message_id, text, keyboard)
                    .await
            }
            None => self.present(text, keyboard).await,
        }
    }

    pub async fn record(&self, action: &str, referrer: Option<&str>) {
        self.services
            .analytics
            .record(self.sender(), action, referrer)
            .await;
    }

    /// Answer a button press. Failure only leaves the client spinner running.
    pub async fn acknowledge(&self, callback_id: &str, text: Option<&str>, show_alert: bool) {
        if let Err(e) = self
            .services
            .platform
            .answer_callback(callback_id, text, show_alert)
            .await
        {
            warn!("Failed to answer callback {}: {}", callback_id, e);
        }
    }
}
