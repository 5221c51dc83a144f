//! Bot module - Telegram transport and platform client.

pub mod dispatcher;
mod runtime;
pub mod telegram;
pub mod webhook;

pub use dispatcher::{AppState, build_dispatcher};
pub use runtime::run;
pub use telegram::TelegramPlatform;
