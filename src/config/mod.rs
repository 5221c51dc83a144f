//! Configuration module for Reelgate.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Bot running mode
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    #[default]
    Polling,
    Webhook,
}

/// Where persisted documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// One JSON file per document under the given directory.
    File(PathBuf),
    /// One MongoDB document per key.
    Mongo { uri: String, database: String },
    /// Process-local, lost on restart.
    Memory,
}

/// Configuration problems detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("WEBHOOK_URL (or RENDER_EXTERNAL_HOSTNAME) must be set when BOT_MODE is webhook")]
    WebhookUrlMissing,

    /// Not fatal: operator features are switched off instead.
    #[error("ADMIN_ID is not set; operator notifications, feedback forwarding and /stats are disabled")]
    OperatorMissing,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    /// Full webhook URL, including the `/webhook` path.
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Channels a user must be a member of (`@name` or numeric id).
    pub required_channels: Vec<String>,

    /// The single privileged identity. `None` disables operator features.
    pub operator_id: Option<u64>,

    pub storage: StorageBackend,

    /// Directory with `<code>.json` string table overrides.
    pub lang_path: PathBuf,

    /// Upper bound for every platform call.
    pub request_timeout: Duration,

    /// How many codes `/stats` lists.
    pub stats_top_n: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bot_token = var("BOT_TOKEN")
            .or_else(|| var("TELEGRAM_TOKEN"))
            .ok_or(ConfigError::Missing("BOT_TOKEN"))?;

        let bot_mode = match var("BOT_MODE").map(|m| m.to_lowercase()).as_deref() {
            None | Some("polling") => BotMode::Polling,
            Some("webhook") => BotMode::Webhook,
            Some(other) => {
                return Err(ConfigError::Invalid { name: "BOT_MODE", value: other.to_string() });
            }
        };

        // Base URL, either explicit or derived from the hosting platform
        let webhook_url = var("WEBHOOK_URL")
            .or_else(|| var("RENDER_EXTERNAL_HOSTNAME").map(|host| format!("https://{}", host)))
            .map(|base| format!("{}/webhook", base.trim_end_matches('/')));

        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            return Err(ConfigError::WebhookUrlMissing);
        }

        let webhook_port = match var("PORT").or_else(|| var("WEBHOOK_PORT")) {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value: raw })?,
            None => 8080,
        };

        let required_channels = var("CHANNELS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|ch| !ch.is_empty())
            .map(str::to_string)
            .collect();

        // 0 is how the old deployments spelled "no operator"
        let operator_id = match var("ADMIN_ID") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => None,
                Ok(id) => Some(id),
                Err(_) => return Err(ConfigError::Invalid { name: "ADMIN_ID", value: raw }),
            },
            None => None,
        };

        let storage = match var("STORAGE_BACKEND").map(|b| b.to_lowercase()).as_deref() {
            None | Some("file") => {
                StorageBackend::File(var("DATA_DIR").unwrap_or_else(|| "data".to_string()).into())
            }
            Some("mongo") | Some("mongodb") => StorageBackend::Mongo {
                uri: var("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
                database: var("MONGODB_DATABASE").unwrap_or_else(|| "reelgate".to_string()),
            },
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid { name: "STORAGE_BACKEND", value: other.to_string() });
            }
        };

        let request_timeout = match var("REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid { name: "REQUEST_TIMEOUT_SECS", value: raw }),
            },
            None => Duration::from_secs(10),
        };

        let stats_top_n = match var("STATS_TOP_N") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::Invalid { name: "STATS_TOP_N", value: raw })?,
            None => 10,
        };

        Ok(Self {
            bot_token,
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret: var("WEBHOOK_SECRET"),
            required_channels,
            operator_id,
            storage,
            lang_path: var("LANG_PATH").unwrap_or_else(|| "langs".to_string()).into(),
            request_timeout,
            stats_top_n,
        })
    }

    /// The operator id, or the reason operator features are off.
    pub fn operator(&self) -> Result<u64, ConfigError> {
        self.operator_id.ok_or(ConfigError::OperatorMissing)
    }
}
