//! /start command plugin.
//!
//! Greets the user. `/start <ref>` deep links record the referrer.

use crate::conversation::{Context, ConversationError};
use crate::utils::first_token;

pub async fn start_command(ctx: &Context<'_>, args: &str) -> Result<(), ConversationError> {
    let lang = ctx.language().await;

    ctx.present(&ctx.welcome(&lang), None).await?;
    ctx.record("start", first_token(args)).await;

    Ok(())
}
