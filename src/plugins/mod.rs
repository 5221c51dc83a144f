//! Plugin system for command and button handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Routing to it from `handle_command()` or `handle_callback()`

pub mod content;
pub mod feedback;
pub mod help;
pub mod language;
pub mod start;
pub mod stats;
pub mod subscription;

use teloxide::utils::command::BotCommands;
use tracing::debug;

use crate::conversation::{Context, ConversationError};
use crate::platform::MessageId;
use crate::subscription::CHECK_SUBSCRIPTION;

/// All bot commands.
#[derive(BotCommands, Debug, Clone, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start(String),

    #[command(description = "How to use the bot")]
    Help,

    #[command(description = "Change language")]
    Language,

    #[command(description = "Send feedback to the admin")]
    Feedback,

    #[command(hide)]
    Stats,
}

/// Commands skip the feedback and subscription stages.
pub async fn handle_command(ctx: &Context<'_>, command: &Command) -> Result<(), ConversationError> {
    match command {
        Command::Start(args) => start::start_command(ctx, args).await,
        Command::Help => help::help_command(ctx).await,
        Command::Language => language::language_command(ctx).await,
        Command::Feedback => feedback::feedback_command(ctx).await,
        Command::Stats => stats::stats_command(ctx).await,
    }
}

pub async fn handle_callback(
    ctx: &Context<'_>,
    callback_id: &str,
    data: &str,
    message_id: Option<MessageId>,
) -> Result<(), ConversationError> {
    if let Some(code) = data.strip_prefix(language::CALLBACK_PREFIX) {
        return language::language_callback(ctx, callback_id, code, message_id).await;
    }

    if data == CHECK_SUBSCRIPTION {
        return subscription::check_subscription_callback(ctx, callback_id, message_id).await;
    }

    debug!("Ignoring unknown callback data {:?}", data);
    ctx.acknowledge(callback_id, None, false).await;
    Ok(())
}
