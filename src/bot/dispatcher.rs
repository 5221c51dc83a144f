//! Message dispatcher setup.
//!
//! Turns Telegram updates from private chats into [`IncomingUpdate`]s and
//! hands them to the conversation.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::User;
use tracing::debug;

use crate::conversation::{Conversation, IncomingUpdate, Sender, UpdateKind};
use crate::plugins::Command;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<Conversation>,
}

impl AppState {
    pub fn new(conversation: Arc<Conversation>) -> Self {
        Self { conversation }
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    // Private chats only: commands first, then plain text. Unknown
    // commands and non-text messages fall through unhandled.
    let message_handler = Update::filter_message()
        .filter(|msg: Message| msg.chat.is_private())
        .branch(teloxide::filter_command::<Command, _>().endpoint(on_command))
        .branch(
            dptree::filter_map(|msg: Message| {
                msg.text()
                    .filter(|text| !text.starts_with('/'))
                    .map(str::to_owned)
            })
            .endpoint(on_text),
        );

    let callback_handler = Update::filter_callback_query()
        .filter(|q: CallbackQuery| {
            q.message
                .as_ref()
                .map(|m| m.chat().is_private())
                .unwrap_or(true)
        })
        .endpoint(on_callback);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}

fn sender(user: &User) -> Sender {
    Sender {
        id: user.id.0,
        username: user.username.clone(),
        display_name: user.full_name(),
    }
}

async fn on_command(update: Update, msg: Message, cmd: Command, state: AppState) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    state
        .conversation
        .handle_update(IncomingUpdate {
            id: update.id.0,
            sender: sender(user),
            chat_id: msg.chat.id.0,
            kind: UpdateKind::Command(cmd),
        })
        .await;
    Ok(())
}

async fn on_text(update: Update, msg: Message, text: String, state: AppState) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    state
        .conversation
        .handle_update(IncomingUpdate {
            id: update.id.0,
            sender: sender(user),
            chat_id: msg.chat.id.0,
            kind: UpdateKind::Text(text),
        })
        .await;
    Ok(())
}

async fn on_callback(update: Update, q: CallbackQuery, state: AppState) -> anyhow::Result<()> {
    let Some(data) = q.data.clone() else {
        debug!("Callback {} without data", q.id);
        return Ok(());
    };

    // A private chat's id is the user's id.
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id.0)
        .unwrap_or(q.from.id.0 as i64);

    state
        .conversation
        .handle_update(IncomingUpdate {
            id: update.id.0,
            sender: sender(&q.from),
            chat_id,
            kind: UpdateKind::Callback {
                id: q.id.clone(),
                data,
                message_id: q.message.as_ref().map(|m| m.id().0),
            },
        })
        .await;
    Ok(())
}
