//! Outbound Bot API calls and inline-keyboard rendering.

use crate::types::{TgResponse, TgSentMessage};
use crate::TelegramTransport;
use herald_core::error::HeraldError;
use herald_core::keyboard::{ButtonGrid, ChoiceButton};
use tracing::{info, warn};

impl TelegramTransport {
    /// POST a JSON body to a Bot API method, returning the sent message id.
    pub(crate) async fn call_send(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<i64, HeraldError> {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| HeraldError::Transport(format!("telegram {method} failed: {e}")))?;

        let body: TgResponse<TgSentMessage> = resp
            .json()
            .await
            .map_err(|e| HeraldError::Transport(format!("telegram {method} parse failed: {e}")))?;

        if !body.ok {
            return Err(HeraldError::Transport(format!(
                "telegram {method} rejected: {}",
                body.description.unwrap_or_default()
            )));
        }

        body.result
            .map(|m| m.message_id)
            .ok_or_else(|| HeraldError::Transport(format!("telegram {method} returned no message")))
    }

    /// Register bot commands so the operator sees an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "start", "description": "Show available commands" },
                { "command": "post", "description": "Draft a new channel post" },
                { "command": "skip", "description": "Skip the media step" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&commands).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!("failed to register Telegram bot commands: {e}");
            }
        }
    }
}

/// Render a link-button grid as an `InlineKeyboardMarkup` value.
pub(crate) fn link_keyboard(grid: &ButtonGrid) -> serde_json::Value {
    let rows: Vec<Vec<serde_json::Value>> = grid
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| serde_json::json!({ "text": b.label, "url": b.url }))
                .collect()
        })
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

/// Render callback choice buttons as a single-row inline keyboard.
pub(crate) fn choice_keyboard(choices: &[ChoiceButton]) -> serde_json::Value {
    let row: Vec<serde_json::Value> = choices
        .iter()
        .map(|c| serde_json::json!({ "text": c.label, "callback_data": c.data }))
        .collect();
    serde_json::json!({ "inline_keyboard": [row] })
}
