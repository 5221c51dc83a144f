//! Text message pipeline.

use super::{Context, ConversationError};
use crate::plugins::{content, feedback, subscription};

/// Whether a stage handled the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStage {
    /// A pending feedback request swallows the message.
    FeedbackConsumption,
    /// Non-members get the join prompt.
    SubscriptionGate,
    /// Everything else is a content code.
    CodeResolution,
}

/// Stages in priority order.
pub const TEXT_PIPELINE: [TextStage; 3] = [
    TextStage::FeedbackConsumption,
    TextStage::SubscriptionGate,
    TextStage::CodeResolution,
];

impl TextStage {
    async fn run(self, ctx: &Context<'_>, lang: &str, text: &str) -> Result<Flow, ConversationError> {
        match self {
            Self::FeedbackConsumption => feedback::consume_feedback(ctx, lang, text).await,
            Self::SubscriptionGate => subscription::require_subscription(ctx, lang).await,
            Self::CodeResolution => content::deliver_code(ctx, lang, text).await,
        }
    }
}

pub async fn handle_text(ctx: &Context<'_>, text: &str) -> Result<(), ConversationError> {
    let lang = ctx.language().await;

    for stage in TEXT_PIPELINE {
        if stage.run(ctx, &lang, text).await? == Flow::Done {
            break;
        }
    }
    Ok(())
}
