//! Long-polling update loop and Transport trait implementation.

use crate::send::{choice_keyboard, link_keyboard};
use crate::types::{TgResponse, TgUpdate};
use crate::TelegramTransport;
use async_trait::async_trait;
use herald_core::{
    draft::MediaReference,
    error::HeraldError,
    event::InboundEvent,
    keyboard::{ButtonGrid, ChoiceButton},
    traits::Transport,
};
use tokio::sync::mpsc;
use tracing::{error, info};

#[async_trait]
impl Transport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<InboundEvent>, HeraldError> {
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let last_update_id = self.last_update_id.clone();

        info!("Telegram transport starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url = format!("{base_url}/getUpdates?timeout=30");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let Some(event) = to_event(update) else {
                        continue;
                    };
                    if tx.send(event).await.is_err() {
                        info!("telegram transport receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        buttons: Option<&ButtonGrid>,
    ) -> Result<i64, HeraldError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(grid) = buttons {
            body["reply_markup"] = link_keyboard(grid);
        }
        self.call_send("sendMessage", body).await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        buttons: Option<&ButtonGrid>,
    ) -> Result<i64, HeraldError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "photo": file_id,
            "caption": caption,
            "parse_mode": "HTML",
        });
        if let Some(grid) = buttons {
            body["reply_markup"] = link_keyboard(grid);
        }
        self.call_send("sendPhoto", body).await
    }

    async fn send_video(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        buttons: Option<&ButtonGrid>,
    ) -> Result<i64, HeraldError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "video": file_id,
            "caption": caption,
            "parse_mode": "HTML",
        });
        if let Some(grid) = buttons {
            body["reply_markup"] = link_keyboard(grid);
        }
        self.call_send("sendVideo", body).await
    }

    async fn send_choice(
        &self,
        chat_id: i64,
        text: &str,
        choices: &[ChoiceButton],
    ) -> Result<i64, HeraldError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "reply_markup": choice_keyboard(choices),
        });
        self.call_send("sendMessage", body).await
    }

    async fn edit_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
    ) -> Result<(), HeraldError> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        self.call_send("editMessageText", body).await.map(|_| ())
    }

    async fn ack_callback(&self, callback_id: &str) -> Result<(), HeraldError> {
        // answerCallbackQuery echoes `true`, not a message.
        let url = format!("{}/answerCallbackQuery", self.base_url);
        let body = serde_json::json!({ "callback_query_id": callback_id });
        self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                HeraldError::Transport(format!("telegram answerCallbackQuery failed: {e}"))
            })?;
        Ok(())
    }

    async fn stop(&self) -> Result<(), HeraldError> {
        info!("Telegram transport stopped");
        Ok(())
    }
}

/// Reduce one update to an inbound event; `None` for shapes Herald ignores
/// (edits, joins, media types other than photo/video, callbacks without
/// data).
pub(crate) fn to_event(update: TgUpdate) -> Option<InboundEvent> {
    if let Some(cb) = update.callback_query {
        let msg = cb.message?;
        return Some(InboundEvent::Callback {
            sender_id: cb.from.id,
            chat_id: msg.chat.id,
            message_id: msg.message_id,
            callback_id: cb.id,
            data: cb.data?,
        });
    }

    let msg = update.message?;
    let sender_id = msg.from.as_ref()?.id;

    let media = if let Some(photos) = &msg.photo {
        // Telegram sends multiple sizes; the last is the largest.
        MediaReference::Photo {
            file_id: photos.last()?.file_id.clone(),
        }
    } else if let Some(video) = &msg.video {
        MediaReference::Video {
            file_id: video.file_id.clone(),
        }
    } else {
        MediaReference::None
    };

    if msg.text.is_none() && media == MediaReference::None {
        return None;
    }

    Some(InboundEvent::Message {
        sender_id,
        chat_id: msg.chat.id,
        text: msg.text,
        media,
    })
}
