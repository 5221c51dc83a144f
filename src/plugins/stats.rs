//! /stats command plugin (operator only).

use tracing::debug;

use crate::conversation::{Context, ConversationError};

pub async fn stats_command(ctx: &Context<'_>) -> Result<(), ConversationError> {
    if !ctx.is_operator() {
        debug!("Ignoring /stats from user {}", ctx.user_id());
        return Ok(());
    }

    let lang = ctx.language().await;
    let services = ctx.services;

    let users = services.profiles.known_users().await;
    let downloads = services.usage.total().await;
    let top = services.usage.top(services.stats_top_n).await;

    let mut text = ctx
        .text(&lang, "stats.summary")
        .replace("{users}", &users.to_string())
        .replace("{downloads}", &downloads.to_string());

    text.push_str("\n\n");
    if top.is_empty() {
        text.push_str(&ctx.text(&lang, "stats.empty"));
    } else {
        text.push_str(&ctx.text(&lang, "stats.top_header"));
        let line = ctx.text(&lang, "stats.top_line");
        for (rank, (code, count)) in top.iter().enumerate() {
            text.push('\n');
            text.push_str(
                &line
                    .replace("{rank}", &(rank + 1).to_string())
                    .replace("{code}", code)
                    .replace("{count}", &count.to_string()),
            );
        }
    }

    ctx.present(&text, None).await?;
    Ok(())
}
