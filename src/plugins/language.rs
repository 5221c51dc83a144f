//! Language selection.
//!
//! `/language` shows one button per supported language; pressing one sends
//! `lang:<code>`.

use tracing::debug;

use crate::conversation::{Context, ConversationError};
use crate::i18n::{SUPPORTED_LANGUAGES, Translations, is_supported};
use crate::platform::{Button, Keyboard, MessageId};

pub const CALLBACK_PREFIX: &str = "lang:";

/// One row per language, labelled in that language.
pub fn language_keyboard(t: &Translations) -> Keyboard {
    SUPPORTED_LANGUAGES
        .iter()
        .map(|code| {
            vec![Button::callback(
                t.get_text(code, "language_name"),
                format!("{}{}", CALLBACK_PREFIX, code),
            )]
        })
        .collect()
}

pub async fn language_command(ctx: &Context<'_>) -> Result<(), ConversationError> {
    let lang = ctx.language().await;
    let keyboard = language_keyboard(&ctx.services.translations);

    ctx.present(&ctx.text(&lang, "language.prompt"), Some(&keyboard))
        .await?;
    ctx.record("language_menu", None).await;

    Ok(())
}

pub async fn language_callback(
    ctx: &Context<'_>,
    callback_id: &str,
    code: &str,
    message_id: Option<MessageId>,
) -> Result<(), ConversationError> {
    ctx.acknowledge(callback_id, None, false).await;

    if !is_supported(code) {
        debug!("User {} picked unsupported language {:?}", ctx.user_id(), code);
        return Ok(());
    }

    ctx.services.profiles.set_language(ctx.user_id(), code).await?;

    let text = format!("{}\n\n{}", ctx.text(code, "language.changed"), ctx.welcome(code));
    ctx.present_on(message_id, &text, None).await?;
    ctx.record(&format!("language_change_{}", code), None).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_labels_and_data() {
        let keyboard = language_keyboard(&Translations::embedded());

        assert_eq!(
            keyboard,
            vec![
                vec![Button::callback("🇬🇧 English", "lang:en")],
                vec![Button::callback("🇷🇺 Русский", "lang:ru")],
                vec![Button::callback("🇺🇿 O'zbekcha", "lang:uz")],
            ]
        );
    }
}
