//! # herald-telegram
//!
//! Telegram Bot API transport for Herald.
//!
//! Uses long polling via `getUpdates`; outbound posts go through
//! `sendMessage`/`sendPhoto`/`sendVideo` with inline keyboards.
//! Docs: <https://core.telegram.org/bots/api>

mod polling;
mod send;
mod types;


use herald_core::config::TelegramConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Telegram transport using the Bot API with long polling.
pub struct TelegramTransport {
    client: reqwest::Client,
    base_url: String,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
}

impl TelegramTransport {
    /// Create a new transport from config.
    pub fn new(config: &TelegramConfig) -> Self {
        let base_url = format!("https://api.telegram.org/bot{}", config.bot_token);
        Self {
            client: reqwest::Client::new(),
            base_url,
            last_update_id: Arc::new(Mutex::new(None)),
        }
    }
}
