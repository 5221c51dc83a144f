//! /help command plugin.

use crate::conversation::{Context, ConversationError};

pub async fn help_command(ctx: &Context<'_>) -> Result<(), ConversationError> {
    let lang = ctx.language().await;

    ctx.present(&ctx.text(&lang, "help"), None).await?;
    ctx.record("help", None).await;

    Ok(())
}
