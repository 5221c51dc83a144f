//! Subscription checks against the required channels.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::cache::{CacheConfig, TypedCache};
use crate::i18n::Translations;
use crate::platform::{Button, ChannelRef, ChatInfo, ChatPlatform, Keyboard};

/// Callback data of the "I have joined" button.
pub const CHECK_SUBSCRIPTION: &str = "check_subscription";

/// Text and buttons asking the user to join the required channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPrompt {
    pub text: String,
    pub keyboard: Keyboard,
}

/// Decides whether a user may use the bot.
///
/// With no required channels the gate is open. Otherwise every channel is
/// checked in configuration order, stopping at the first one the user is
/// not in. A failed check counts as "not subscribed".
#[derive(Clone)]
pub struct SubscriptionGate {
    platform: Arc<dyn ChatPlatform>,
    channels: Vec<ChannelRef>,
    info_cache: TypedCache<ChannelRef, ChatInfo>,
}

impl SubscriptionGate {
    pub fn new(platform: Arc<dyn ChatPlatform>, channels: Vec<ChannelRef>) -> Self {
        Self {
            platform,
            channels,
            info_cache: TypedCache::new("channel_info", CacheConfig::channel_info()),
        }
    }

    pub async fn is_subscribed(&self, user_id: u64) -> bool {
        for channel in &self.channels {
            match self.platform.get_chat_member(channel, user_id).await {
                Ok(status) if status.is_subscribed() => {
                    debug!("User {} is {:?} in {}", user_id, status, channel);
                }
                Ok(status) => {
                    debug!("User {} is {:?} in {}, gate closed", user_id, status, channel);
                    return false;
                }
                Err(e) => {
                    warn!(
                        "Membership check of user {} in {} failed, treating as not subscribed: {}",
                        user_id, channel, e
                    );
                    return false;
                }
            }
        }
        true
    }

    /// Build the join prompt for all required channels.
    pub async fn subscription_prompt(&self, t: &Translations, lang: &str) -> SubscriptionPrompt {
        let infos = join_all(self.channels.iter().map(|ch| self.channel_info(ch))).await;

        let mut lines = Vec::with_capacity(self.channels.len());
        let mut keyboard: Keyboard = Vec::with_capacity(self.channels.len() + 1);

        for (channel, info) in self.channels.iter().zip(infos) {
            let title = display_name(channel, &info);
            lines.push(format!("• {}", title));
            keyboard.push(vec![Button::url(
                t.get_text(lang, "subscription.join_button").replace("{title}", &title),
                join_link(channel, &info),
            )]);
        }

        keyboard.push(vec![Button::callback(
            t.get_text(lang, "subscription.check_button"),
            CHECK_SUBSCRIPTION,
        )]);

        SubscriptionPrompt {
            text: t
                .get_text(lang, "subscription.prompt")
                .replace("{channels}", &lines.join("\n")),
            keyboard,
        }
    }

    /// Channel metadata, cached. A failed lookup yields empty info (not cached).
    async fn channel_info(&self, channel: &ChannelRef) -> ChatInfo {
        if let Some(info) = self.info_cache.get(channel) {
            return info;
        }

        match self.platform.get_chat(channel).await {
            Ok(info) => {
                self.info_cache.insert(channel.clone(), info.clone());
                info
            }
            Err(e) => {
                warn!("Failed to fetch info for {}: {}", channel, e);
                ChatInfo::default()
            }
        }
    }
}

fn display_name(channel: &ChannelRef, info: &ChatInfo) -> String {
    info.title
        .clone()
        .or_else(|| info.username.as_ref().map(|u| format!("@{}", u)))
        .unwrap_or_else(|| channel.to_string())
}

/// Public username, then invite link, then a numeric deep link.
fn join_link(channel: &ChannelRef, info: &ChatInfo) -> String {
    if let Some(username) = &info.username {
        return format!("https://t.me/{}", username);
    }
    if let ChannelRef::Username(name) = channel {
        return format!("https://t.me/{}", name);
    }
    if let Some(link) = &info.invite_link {
        return link.clone();
    }
    channel.fallback_link()
}
