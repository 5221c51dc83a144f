//! Subscription prompt and the "I have joined" button.

use crate::conversation::{Context, ConversationError, Flow};
use crate::platform::MessageId;

/// Second text stage: stop non-members with the join prompt.
pub async fn require_subscription(ctx: &Context<'_>, lang: &str) -> Result<Flow, ConversationError> {
    let gate = &ctx.services.gate;
    if gate.is_subscribed(ctx.user_id()).await {
        return Ok(Flow::Continue);
    }

    let prompt = gate
        .subscription_prompt(&ctx.services.translations, lang)
        .await;
    ctx.present(&prompt.text, Some(&prompt.keyboard)).await?;

    Ok(Flow::Done)
}

/// Still not a member: only an alert, the prompt stays as it is.
pub async fn check_subscription_callback(
    ctx: &Context<'_>,
    callback_id: &str,
    message_id: Option<MessageId>,
) -> Result<(), ConversationError> {
    if !ctx.services.gate.is_subscribed(ctx.user_id()).await {
        let lang = ctx.services.profiles.peek_language(ctx.user_id()).await;
        let alert = ctx.text(&lang, "subscription.not_subscribed");
        ctx.acknowledge(callback_id, Some(alert.as_str()), true).await;
        return Ok(());
    }

    ctx.acknowledge(callback_id, None, false).await;

    let lang = ctx.language().await;
    let text = format!(
        "{}\n\n{}",
        ctx.text(&lang, "subscription.confirmed"),
        ctx.welcome(&lang)
    );
    ctx.present_on(message_id, &text, None).await?;

    Ok(())
}
