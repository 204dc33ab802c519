use crate::{
    error::HeraldError,
    event::InboundEvent,
    keyboard::{ButtonGrid, ChoiceButton},
};
use async_trait::async_trait;

/// Messaging transport trait, the boundary with the bot client.
///
/// The gateway and publisher only see this trait, so the wizard flow is
/// testable against a recording mock. Send methods return the platform
/// message id of the delivered message so the confirm prompt can later be
/// edited in place.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name.
    fn name(&self) -> &str;

    /// Start listening for inbound events.
    /// Returns a receiver that yields events in arrival order.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundEvent>, HeraldError>;

    /// Send a text message, optionally with a link-button keyboard.
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        buttons: Option<&ButtonGrid>,
    ) -> Result<i64, HeraldError>;

    /// Send a photo by its transport file handle, with caption and keyboard.
    async fn send_photo(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        buttons: Option<&ButtonGrid>,
    ) -> Result<i64, HeraldError>;

    /// Send a video by its transport file handle, with caption and keyboard.
    async fn send_video(
        &self,
        chat_id: i64,
        file_id: &str,
        caption: &str,
        buttons: Option<&ButtonGrid>,
    ) -> Result<i64, HeraldError>;

    /// Send a prompt carrying callback choice buttons.
    async fn send_choice(
        &self,
        chat_id: i64,
        text: &str,
        choices: &[ChoiceButton],
    ) -> Result<i64, HeraldError>;

    /// Replace the text of a previously sent message, dropping its keyboard.
    async fn edit_text(&self, chat_id: i64, message_id: i64, text: &str)
        -> Result<(), HeraldError>;

    /// Acknowledge a callback query so the client stops its progress spinner.
    async fn ack_callback(&self, callback_id: &str) -> Result<(), HeraldError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), HeraldError>;
}
