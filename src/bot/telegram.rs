//! [`ChatPlatform`] over the Telegram Bot API.

use async_trait::async_trait;
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{
    ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId as TgMessageId, Recipient,
};
use tracing::warn;
use url::Url;

use super::dispatcher::ThrottledBot;
use crate::platform::{
    Button, ButtonAction, ChannelRef, ChatInfo, ChatPlatform, ContentRef, Keyboard, MemberStatus, MessageId,
    PlatformError,
};

pub struct TelegramPlatform {
    bot: ThrottledBot,
}

impl TelegramPlatform {
    pub fn new(bot: ThrottledBot) -> Self {
        Self { bot }
    }
}

fn api(e: RequestError) -> PlatformError {
    PlatformError::Api(e.to_string())
}

fn recipient(channel: &ChannelRef) -> Recipient {
    match channel {
        ChannelRef::Username(name) => Recipient::ChannelUsername(format!("@{}", name)),
        ChannelRef::Id(id) => Recipient::Id(ChatId(*id)),
    }
}

fn button(b: &Button) -> Option<InlineKeyboardButton> {
    match &b.action {
        ButtonAction::Callback(data) => Some(InlineKeyboardButton::callback(b.text.clone(), data.clone())),
        ButtonAction::Url(link) => match Url::parse(link) {
            Ok(url) => Some(InlineKeyboardButton::url(b.text.clone(), url)),
            Err(e) => {
                warn!("Dropping button {:?} with invalid link {:?}: {}", b.text, link, e);
                None
            }
        },
    }
}

fn markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        keyboard
            .iter()
            .map(|row| row.iter().filter_map(button).collect::<Vec<_>>()),
    )
}

fn member_status(kind: &ChatMemberKind) -> MemberStatus {
    match kind {
        ChatMemberKind::Owner(_) => MemberStatus::Owner,
        ChatMemberKind::Administrator(_) => MemberStatus::Administrator,
        ChatMemberKind::Member => MemberStatus::Member,
        ChatMemberKind::Restricted(_) => MemberStatus::Restricted,
        ChatMemberKind::Left => MemberStatus::Left,
        ChatMemberKind::Banned(_) => MemberStatus::Kicked,
    }
}

#[async_trait]
impl ChatPlatform for TelegramPlatform {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageId, PlatformError> {
        let mut req = self.bot.send_message(ChatId(chat_id), text);
        if let Some(keyboard) = keyboard {
            req = req.reply_markup(markup(keyboard));
        }
        req.await.map(|msg| msg.id.0).map_err(api)
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), PlatformError> {
        let mut req = self
            .bot
            .edit_message_text(ChatId(chat_id), TgMessageId(message_id), text);
        if let Some(keyboard) = keyboard {
            req = req.reply_markup(markup(keyboard));
        }
        req.await.map(|_| ()).map_err(api)
    }

    async fn delete_message(&self, chat_id: i64, message_id: MessageId) -> Result<(), PlatformError> {
        self.bot
            .delete_message(ChatId(chat_id), TgMessageId(message_id))
            .await
            .map(|_| ())
            .map_err(api)
    }

    async fn send_content(&self, chat_id: i64, content: &ContentRef) -> Result<MessageId, PlatformError> {
        let file = match content {
            ContentRef::InlineFile(file_id) => InputFile::file_id(file_id.clone()),
            ContentRef::RemoteUrl(link) => {
                let url = Url::parse(link)
                    .map_err(|e| PlatformError::Api(format!("invalid content URL {:?}: {}", link, e)))?;
                InputFile::url(url)
            }
        };

        self.bot
            .send_video(ChatId(chat_id), file)
            .await
            .map(|msg| msg.id.0)
            .map_err(api)
    }

    async fn get_chat_member(&self, channel: &ChannelRef, user_id: u64) -> Result<MemberStatus, PlatformError> {
        self.bot
            .get_chat_member(recipient(channel), UserId(user_id))
            .await
            .map(|member| member_status(&member.kind))
            .map_err(api)
    }

    async fn get_chat(&self, channel: &ChannelRef) -> Result<ChatInfo, PlatformError> {
        let chat = self.bot.get_chat(recipient(channel)).await.map_err(api)?;

        Ok(ChatInfo {
            title: chat.title().map(str::to_string),
            username: chat.username().map(str::to_string),
            invite_link: chat.invite_link().map(str::to_string),
        })
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), PlatformError> {
        let mut req = self.bot.answer_callback_query(callback_id);
        if let Some(text) = text {
            req = req.text(text);
        }
        req.show_alert(show_alert).await.map(|_| ()).map_err(api)
    }
}
