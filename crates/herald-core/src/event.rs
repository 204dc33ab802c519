//! Inbound events delivered by a transport.

use crate::draft::MediaReference;

/// A transport event, already reduced to the shapes the wizard consumes.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// An inbound chat message.
    Message {
        sender_id: i64,
        /// Chat the message arrived in; replies go back here.
        chat_id: i64,
        text: Option<String>,
        media: MediaReference,
    },
    /// An inline button press.
    Callback {
        sender_id: i64,
        chat_id: i64,
        /// The message carrying the pressed keyboard, for in-place edits.
        message_id: i64,
        callback_id: String,
        data: String,
    },
}

impl InboundEvent {
    pub fn sender_id(&self) -> i64 {
        match self {
            Self::Message { sender_id, .. } | Self::Callback { sender_id, .. } => *sender_id,
        }
    }
}
