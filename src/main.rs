//! Reelgate - subscription-gated content bot for Telegram.
//!
//! Users send short codes and get the matching video back, once they are
//! members of every required channel.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - Document stores (JSON files, MongoDB, memory) and repositories
//! - `cache` - TTL caches with Moka
//! - `platform` - Chat platform abstraction and call timeouts
//! - `conversation` - Per-user state machine, one update at a time
//! - `plugins` - Command, button and text handlers
//! - `subscription` - Channel membership gate
//! - `presenter` - Single live message per user
//! - `analytics` - Event log and operator notifications
//! - `bot` - Telegram client, dispatcher, polling and webhook runners
//! - `i18n` - String tables
//! - `utils` - Utility functions

mod analytics;
mod bot;
mod cache;
mod config;
mod conversation;
mod database;
mod i18n;
mod platform;
mod plugins;
mod presenter;
mod subscription;
#[cfg(test)]
mod testing;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bot::{AppState, TelegramPlatform};
use config::Config;
use conversation::{Conversation, ConversationSettings};
use i18n::Translations;
use platform::{ChannelRef, TimeoutPlatform};
use plugins::Command;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("reelgate=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting Reelgate bot...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    match config.operator() {
        Ok(id) => info!("Operator: {}", id),
        Err(e) => warn!("{}", e),
    }

    let (storage, mongo) = database::open(&config.storage).await?;
    info!("Storage ready");

    let translations = Arc::new(Translations::load(&config.lang_path));

    // Throttle respects Telegram's rate limits:
    // - 30 messages per second globally
    // - 1 message per second to the same chat
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register commands: {}", e);
    }

    let channels: Vec<ChannelRef> = config
        .required_channels
        .iter()
        .filter_map(|raw| {
            let channel = ChannelRef::parse(raw);
            if channel.is_none() {
                warn!("Ignoring invalid channel {:?} in CHANNELS", raw);
            }
            channel
        })
        .collect();
    if channels.is_empty() {
        info!("No required channels, subscription gate disabled");
    } else {
        info!("Required channels: {:?}", channels);
    }

    let platform = TimeoutPlatform::new(TelegramPlatform::new(bot.clone()), config.request_timeout);
    let conversation = Conversation::new(
        Arc::new(platform),
        storage,
        translations,
        ConversationSettings {
            channels,
            operator_id: config.operator_id,
            stats_top_n: config.stats_top_n,
        },
    );

    let dispatcher = bot::build_dispatcher(bot.clone(), AppState::new(Arc::new(conversation)));

    let result = bot::run(&config, bot, dispatcher).await;

    if let Some(db) = mongo {
        db.shutdown().await;
    }

    info!("Bye");
    result
}
