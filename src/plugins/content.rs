//! Code lookup and delivery.

use tracing::{error, info, warn};

use crate::conversation::{Context, ConversationError, Flow};

/// Last text stage: treat the message as a content code.
///
/// The content goes out as its own message, outside the presenter, so it
/// stays in the chat when the next prompt replaces the live message.
pub async fn deliver_code(ctx: &Context<'_>, lang: &str, text: &str) -> Result<Flow, ConversationError> {
    let code = text.trim();
    let services = ctx.services;

    let Some(content) = services.content.resolve(code).await else {
        ctx.present(&ctx.text(lang, "content.not_found"), None).await?;
        ctx.record("unknown_code", None).await;
        return Ok(Flow::Done);
    };

    if let Err(e) = services.platform.send_content(ctx.chat_id(), &content).await {
        warn!("Delivery of {:?} to user {} failed: {}", code, ctx.user_id(), e);
        ctx.present(&ctx.text(lang, "common.error"), None).await?;
        return Ok(Flow::Done);
    }

    match services.usage.record_delivery(code).await {
        Ok(count) => info!("Delivered {:?} to user {} ({} total)", code, ctx.user_id(), count),
        Err(e) => error!("Delivered {:?} but failed to count it: {}", code, e),
    }
    ctx.record(&format!("video_request_{}", code), None).await;

    Ok(Flow::Done)
}
