//! Feedback to the operator.
//!
//! `/feedback` arms a flag in the profile; the next text message is taken as
//! the feedback, forwarded to the operator and the flag cleared.

use tracing::{info, warn};

use crate::conversation::{Context, ConversationError, Flow, Sender, UserState};
use crate::utils::now_rfc3339;

pub async fn feedback_command(ctx: &Context<'_>) -> Result<(), ConversationError> {
    let lang = ctx.language().await;
    ctx.services
        .profiles
        .set_feedback_flag(ctx.user_id(), true)
        .await?;

    ctx.present(&ctx.text(&lang, "feedback.prompt"), None).await?;
    ctx.record("feedback_start", None).await;

    Ok(())
}

/// First text stage: take the message as feedback if one was requested.
pub async fn consume_feedback(ctx: &Context<'_>, lang: &str, text: &str) -> Result<Flow, ConversationError> {
    if ctx.services.user_state(ctx.user_id()).await != UserState::AwaitingFeedback {
        return Ok(Flow::Continue);
    }

    ctx.services
        .profiles
        .set_feedback_flag(ctx.user_id(), false)
        .await?;
    forward(ctx, text).await;

    ctx.present(&ctx.text(lang, "feedback.received"), None).await?;
    ctx.record("feedback_sent", None).await;

    Ok(Flow::Done)
}

async fn forward(ctx: &Context<'_>, text: &str) {
    let Some(operator) = ctx.services.operator_id else {
        info!("Feedback from user {} not forwarded, no operator configured", ctx.user_id());
        return;
    };

    let message = format_feedback(ctx.sender(), &now_rfc3339(), text);
    if let Err(e) = ctx
        .services
        .platform
        .send_message(operator as i64, &message, None)
        .await
    {
        warn!("Failed to forward feedback of user {}: {}", ctx.user_id(), e);
    }
}

fn format_feedback(sender: &Sender, timestamp: &str, text: &str) -> String {
    let username = sender
        .username
        .as_deref()
        .map(|u| format!(" @{}", u))
        .unwrap_or_default();

    format!(
        "📝 Feedback\n👤 {}{} (id {})\n🕐 {}\n\n{}",
        sender.display_name, username, sender.id, timestamp, text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_feedback() {
        let sender = Sender {
            id: 7,
            username: None,
            display_name: "Ann Lee".into(),
        };

        assert_eq!(
            format_feedback(&sender, "2026-01-01T00:00:00Z", "Nice"),
            "📝 Feedback\n👤 Ann Lee (id 7)\n🕐 2026-01-01T00:00:00Z\n\nNice"
        );
    }
}
