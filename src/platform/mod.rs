//! Chat platform abstraction.
//!
//! Everything the conversation needs from Telegram goes through
//! [`ChatPlatform`]. The production implementation lives in
//! `bot::telegram`; tests use a scripted mock.

mod timeout;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use timeout::TimeoutPlatform;

/// Platform message id.
pub type MessageId = i32;

/// A failed or timed-out platform call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("platform request timed out after {0:?}")]
    Timeout(Duration),

    #[error("platform request failed: {0}")]
    Api(String),
}

/// A channel the user has to join, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelRef {
    /// Public channel, username without `@`.
    Username(String),
    /// Numeric chat id, e.g. `-1001234567890`.
    Id(i64),
}

impl ChannelRef {
    /// Parse `@name`, `name`, `https://t.me/name` or a numeric id.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(id) = raw.parse::<i64>() {
            return Some(Self::Id(id));
        }

        let name = raw
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("t.me/")
            .trim_start_matches('@')
            .trim_end_matches('/');

        let valid = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| Self::Username(name.to_string()))
    }

    /// Link that works without any metadata lookup.
    ///
    /// Numeric supergroup/channel ids map to `t.me/c/<id>` which only opens
    /// for existing members, but it is the best we can do without an invite.
    pub fn fallback_link(&self) -> String {
        match self {
            Self::Username(name) => format!("https://t.me/{}", name),
            Self::Id(id) => {
                let raw = id.to_string();
                let internal = raw.strip_prefix("-100").unwrap_or(raw.trim_start_matches('-'));
                format!("https://t.me/c/{}", internal)
            }
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username(name) => write!(f, "@{}", name),
            Self::Id(id) => write!(f, "{}", id),
        }
    }
}

/// Membership status of a user in a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Only users that left or were kicked count as not subscribed.
    pub fn is_subscribed(self) -> bool {
        !matches!(self, Self::Left | Self::Kicked)
    }
}

/// Channel metadata used for subscription prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatInfo {
    pub title: Option<String>,
    pub username: Option<String>,
    pub invite_link: Option<String>,
}

/// Deliverable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    /// A file id already uploaded to the platform.
    InlineFile(String),
    /// A URL the platform fetches itself.
    RemoteUrl(String),
}

/// Action attached to an inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    Url(String),
    Callback(String),
}

/// Inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }
}

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<Button>>;

/// Operations consumed from the chat platform.
///
/// Implementations report failures; callers decide whether to log, ignore
/// or degrade. Nothing here retries.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PlatformError>;

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), PlatformError>;

    async fn delete_message(&self, chat_id: i64, message_id: MessageId) -> Result<(), PlatformError>;

    async fn send_content(&self, chat_id: i64, content: &ContentRef) -> Result<MessageId, PlatformError>;

    async fn get_chat_member(&self, channel: &ChannelRef, user_id: u64) -> Result<MemberStatus, PlatformError>;

    async fn get_chat(&self, channel: &ChannelRef) -> Result<ChatInfo, PlatformError>;

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), PlatformError>;
}
