//! Configuration loading (TOML file + env override).

use crate::error::HeraldError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Herald configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub herald: HeraldConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeraldConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Telegram bot config.
///
/// `operator_id` is the single authorized user; `channel_id` is the
/// publish destination. Both are required to start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub operator_id: i64,
    #[serde(default)]
    pub channel_id: i64,
}

fn default_name() -> String {
    "herald".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. The
/// `TELEGRAM_BOT_TOKEN` env var overrides the configured token either way.
pub fn load(path: &str) -> Result<Config, HeraldError> {
    let path = Path::new(path);
    let mut config: Config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HeraldError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| HeraldError::Config(format!("failed to parse config: {e}")))?
    } else {
        tracing::info!("Config file not found at {}, using defaults", path.display());
        Config::default()
    };

    if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
        if !token.is_empty() {
            config.telegram.bot_token = token;
        }
    }

    Ok(config)
}
