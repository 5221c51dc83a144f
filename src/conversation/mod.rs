//! Conversation dispatcher.
//!
//! Takes one decoded update at a time and drives the services: profile,
//! subscription gate, content lookup, usage counter, analytics and the
//! message presenter.
//!
//! Updates of one user are handled strictly one after another; different
//! users run concurrently. Redelivered updates are dropped.

mod context;
mod pipeline;
mod update;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

pub use context::{Context, Services, UserState};
pub use pipeline::Flow;
pub use update::{IncomingUpdate, Sender, UpdateKind};

use crate::analytics::AnalyticsRecorder;
use crate::cache::{CacheConfig, TypedCache};
use crate::database::{
    AnalyticsRepository, ContentRepository, ProfileRepository, Storage, StorageError, UsageRepository,
};
use crate::i18n::Translations;
use crate::platform::{ChannelRef, ChatPlatform, PlatformError};
use crate::plugins;
use crate::presenter::MessagePresenter;
use crate::subscription::SubscriptionGate;
use crate::utils::KeyedLocks;

/// Failure of a single update. The user only ever sees the generic error text.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

#[derive(Debug, Clone)]
pub struct ConversationSettings {
    pub channels: Vec<ChannelRef>,
    pub operator_id: Option<u64>,
    pub stats_top_n: usize,
}

pub struct Conversation {
    services: Services,
    user_locks: KeyedLocks<u64>,
    seen_updates: TypedCache<u32, ()>,
}

impl Conversation {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        storage: Storage,
        translations: Arc<Translations>,
        settings: ConversationSettings,
    ) -> Self {
        let profiles = ProfileRepository::new(storage.clone());
        let services = Services {
            content: ContentRepository::new(storage.clone()),
            usage: UsageRepository::new(storage.clone()),
            analytics: AnalyticsRecorder::new(
                AnalyticsRepository::new(storage),
                platform.clone(),
                settings.operator_id,
            ),
            gate: SubscriptionGate::new(platform.clone(), settings.channels),
            presenter: MessagePresenter::new(platform.clone(), profiles.clone()),
            profiles,
            platform,
            translations,
            operator_id: settings.operator_id,
            stats_top_n: settings.stats_top_n,
        };

        Self {
            services,
            user_locks: KeyedLocks::new(),
            seen_updates: TypedCache::new("recent_updates", CacheConfig::recent_updates()),
        }
    }

    #[cfg(test)]
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Handle one update. Returns once every side effect was attempted.
    pub async fn handle_update(&self, update: IncomingUpdate) {
        let user_id = update.sender.id;
        let _guard = self.user_locks.lock(user_id).await;

        if !self.seen_updates.insert_if_absent(update.id, ()) {
            debug!("Dropping redelivered update {} of user {}", update.id, user_id);
            return;
        }
        debug!("Update {} from user {}: {:?}", update.id, user_id, update.kind);

        let ctx = Context {
            services: &self.services,
            update: &update,
        };

        if let Err(e) = route(&ctx).await {
            match &e {
                ConversationError::Storage(_) => error!("Update {} of user {} failed: {}", update.id, user_id, e),
                ConversationError::Platform(_) => warn!("Update {} of user {} failed: {}", update.id, user_id, e),
            }
            present_error(&ctx).await;
        }
    }
}

async fn route(ctx: &Context<'_>) -> Result<(), ConversationError> {
    match &ctx.update.kind {
        UpdateKind::Command(command) => plugins::handle_command(ctx, command).await,
        UpdateKind::Text(text) => pipeline::handle_text(ctx, text).await,
        UpdateKind::Callback { id, data, message_id } => {
            plugins::handle_callback(ctx, id, data, *message_id).await
        }
    }
}

async fn present_error(ctx: &Context<'_>) {
    let lang = ctx.services.profiles.peek_language(ctx.user_id()).await;
    let text = ctx.text(&lang, "common.error");
    if let Err(e) = ctx.present(&text, None).await {
        error!("Could not tell user {} about the failure: {}", ctx.user_id(), e);
    }
}
