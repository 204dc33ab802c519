//! Gateway — the event loop connecting the transport to the post wizard.
//!
//! Inbound events pass the access gate, map to wizard triggers, and the
//! resulting step actions become transport calls. Parser failures re-prompt
//! without losing state; delivery failures reset the wizard to Idle. Nothing
//! here is fatal to the process.

use crate::publisher;
use herald_core::{
    access::AccessGate,
    config::TelegramConfig,
    draft::MediaReference,
    error::HeraldError,
    event::InboundEvent,
    keyboard::ChoiceButton,
    traits::Transport,
    wizard::{Choice, SessionStore, StepAction, Trigger},
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const START_TEXT: &str = "Herald — channel posting assistant.\n\n\
    Commands:\n/post — draft a new channel post";
const PROMPT_TEXT: &str = "Send the post text:";
const PROMPT_MEDIA: &str = "Send a photo or video, or /skip:";
const PROMPT_BUTTONS: &str = "Send the buttons:\n\n\
    Button 1 - http://link.com | Button 2 - http://link.com\n\n\
    Up to 8 buttons per row, up to 15 rows";
const PREVIEW_HEADER: &str = "Preview:";
const CONFIRM_PROMPT: &str = "Publish this post?";
const PUBLISHED_TEXT: &str = "Post published";
const CANCELLED_TEXT: &str = "Publication cancelled";

/// Routes inbound events through the access gate and wizard to the transport.
pub struct Gateway {
    transport: Arc<dyn Transport>,
    gate: AccessGate,
    sessions: SessionStore,
    /// Publish destination.
    channel_id: i64,
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, config: &TelegramConfig) -> Self {
        Self {
            transport,
            gate: AccessGate::new(config.operator_id),
            sessions: SessionStore::default(),
            channel_id: config.channel_id,
        }
    }

    /// Run the main event loop until ctrl-c.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!(
            "Herald gateway running | transport: {} | channel: {}",
            self.transport.name(),
            self.channel_id
        );

        let mut rx = self
            .transport
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start transport: {e}"))?;

        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    self.handle_event(event).await;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        if let Err(e) = self.transport.stop().await {
            warn!("failed to stop transport: {e}");
        }
        info!("Shutdown complete.");
        Ok(())
    }

    /// Process one inbound event: gate, route, perform.
    async fn handle_event(&mut self, event: InboundEvent) {
        let sender = event.sender_id();
        if !self.gate.authorize(sender) {
            warn!("ignoring event from unauthorized sender {sender}");
            return;
        }

        match event {
            InboundEvent::Message {
                chat_id,
                text,
                media,
                ..
            } => {
                if let Some(ref t) = text {
                    if t.split_whitespace().next() == Some("/start") {
                        if let Err(e) = self.transport.send_text(chat_id, START_TEXT, None).await {
                            error!("failed to send greeting: {e}");
                        }
                        return;
                    }
                }

                let Some(trigger) = message_trigger(text, media) else {
                    return;
                };
                self.step(sender, chat_id, None, trigger).await;
            }
            InboundEvent::Callback {
                chat_id,
                message_id,
                callback_id,
                data,
                ..
            } => {
                if let Err(e) = self.transport.ack_callback(&callback_id).await {
                    warn!("failed to ack callback {callback_id}: {e}");
                }

                let Some(choice) = Choice::parse(&data) else {
                    debug!("ignoring unknown callback data: {data}");
                    return;
                };
                self.step(sender, chat_id, Some(message_id), Trigger::Choice(choice))
                    .await;
            }
        }
    }

    /// Advance the operator's wizard and perform the resulting action.
    ///
    /// `prompt_id` is the message carrying the pressed confirm keyboard,
    /// present only for callback-driven steps.
    async fn step(&mut self, operator: i64, chat_id: i64, prompt_id: Option<i64>, trigger: Trigger) {
        let action = match self.sessions.session(operator).apply(trigger) {
            Ok(Some(action)) => action,
            Ok(None) => return,
            Err(HeraldError::ButtonParse(line)) => {
                // Recoverable: the wizard stays on the buttons step.
                let text = format!(
                    "Malformed button line: {line}\n\
                     Expected \"Label - url\", please resend."
                );
                if let Err(e) = self.transport.send_text(chat_id, &text, None).await {
                    error!("failed to report parse error: {e}");
                }
                return;
            }
            Err(e) => {
                error!("wizard step failed: {e}");
                return;
            }
        };

        if let Err(e) = self.perform(operator, chat_id, prompt_id, action).await {
            // Delivery failed mid-step: tell the operator and reset.
            error!("delivery failed: {e}");
            self.sessions.session(operator).reset();
            let note = format!("Delivery failed: {e}\nDraft discarded, start again with /post.");
            if let Err(e2) = self.transport.send_text(chat_id, &note, None).await {
                error!("failed to report delivery error: {e2}");
            }
        }
    }

    /// Map one step action to transport calls.
    async fn perform(
        &self,
        operator: i64,
        chat_id: i64,
        prompt_id: Option<i64>,
        action: StepAction,
    ) -> Result<(), HeraldError> {
        match action {
            StepAction::PromptText => {
                self.transport.send_text(chat_id, PROMPT_TEXT, None).await?;
            }
            StepAction::PromptMedia => {
                self.transport
                    .send_text(chat_id, PROMPT_MEDIA, None)
                    .await?;
            }
            StepAction::PromptButtons => {
                self.transport
                    .send_text(chat_id, PROMPT_BUTTONS, None)
                    .await?;
            }
            StepAction::Preview(draft) => {
                self.transport
                    .send_text(chat_id, PREVIEW_HEADER, None)
                    .await?;
                publisher::send_post(self.transport.as_ref(), chat_id, &draft).await?;

                let choices = [
                    ChoiceButton {
                        label: "✅ Publish".to_string(),
                        data: Choice::Publish.as_data().to_string(),
                    },
                    ChoiceButton {
                        label: "❌ Cancel".to_string(),
                        data: Choice::Cancel.as_data().to_string(),
                    },
                ];
                self.transport
                    .send_choice(chat_id, CONFIRM_PROMPT, &choices)
                    .await?;
            }
            StepAction::Publish(draft) => {
                publisher::send_post(self.transport.as_ref(), self.channel_id, &draft).await?;
                if let Some(message_id) = prompt_id {
                    self.transport
                        .edit_text(chat_id, message_id, PUBLISHED_TEXT)
                        .await?;
                }
                info!("post published to channel {}", self.channel_id);
            }
            StepAction::Cancelled => {
                if let Some(message_id) = prompt_id {
                    self.transport
                        .edit_text(chat_id, message_id, CANCELLED_TEXT)
                        .await?;
                }
                info!("draft cancelled by operator {operator}");
            }
        }
        Ok(())
    }
}

/// Map an inbound message to a wizard trigger.
fn message_trigger(text: Option<String>, media: MediaReference) -> Option<Trigger> {
    if let Some(text) = text {
        return Some(match text.split_whitespace().next() {
            Some("/post") => Trigger::Post,
            Some("/skip") => Trigger::Skip,
            _ => Trigger::Text(text),
        });
    }

    match media {
        MediaReference::None => None,
        media => Some(Trigger::Media(media)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use herald_core::keyboard::ButtonGrid;
    use herald_core::wizard::WizardState;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    const OP: i64 = 7;
    const CHAT: i64 = 7;
    const CHANNEL: i64 = -100500;

    /// One recorded outbound call.
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Text {
            chat_id: i64,
            text: String,
            buttons: Option<ButtonGrid>,
        },
        Photo {
            chat_id: i64,
            file_id: String,
            caption: String,
            buttons: Option<ButtonGrid>,
        },
        Video {
            chat_id: i64,
            file_id: String,
            caption: String,
            buttons: Option<ButtonGrid>,
        },
        Choice {
            chat_id: i64,
            text: String,
            data: Vec<String>,
        },
        Edit {
            chat_id: i64,
            message_id: i64,
            text: String,
        },
        Ack {
            callback_id: String,
        },
    }

    /// Records every outbound call; optionally fails all sends.
    #[derive(Default)]
    struct MockTransport {
        calls: Mutex<Vec<Call>>,
        fail_sends: AtomicBool,
    }

    impl MockTransport {
        fn record(&self, call: Call) -> Result<i64, HeraldError> {
            if self.fail_sends.load(Ordering::Relaxed) {
                return Err(HeraldError::Transport("mock send failure".to_string()));
            }
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            Ok(calls.len() as i64)
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        fn name(&self) -> &str {
            "mock"
        }

        async fn start(&self) -> Result<mpsc::Receiver<InboundEvent>, HeraldError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }

        async fn send_text(
            &self,
            chat_id: i64,
            text: &str,
            buttons: Option<&ButtonGrid>,
        ) -> Result<i64, HeraldError> {
            self.record(Call::Text {
                chat_id,
                text: text.to_string(),
                buttons: buttons.cloned(),
            })
        }

        async fn send_photo(
            &self,
            chat_id: i64,
            file_id: &str,
            caption: &str,
            buttons: Option<&ButtonGrid>,
        ) -> Result<i64, HeraldError> {
            self.record(Call::Photo {
                chat_id,
                file_id: file_id.to_string(),
                caption: caption.to_string(),
                buttons: buttons.cloned(),
            })
        }

        async fn send_video(
            &self,
            chat_id: i64,
            file_id: &str,
            caption: &str,
            buttons: Option<&ButtonGrid>,
        ) -> Result<i64, HeraldError> {
            self.record(Call::Video {
                chat_id,
                file_id: file_id.to_string(),
                caption: caption.to_string(),
                buttons: buttons.cloned(),
            })
        }

        async fn send_choice(
            &self,
            chat_id: i64,
            text: &str,
            choices: &[ChoiceButton],
        ) -> Result<i64, HeraldError> {
            self.record(Call::Choice {
                chat_id,
                text: text.to_string(),
                data: choices.iter().map(|c| c.data.clone()).collect(),
            })
        }

        async fn edit_text(
            &self,
            chat_id: i64,
            message_id: i64,
            text: &str,
        ) -> Result<(), HeraldError> {
            self.record(Call::Edit {
                chat_id,
                message_id,
                text: text.to_string(),
            })
            .map(|_| ())
        }

        async fn ack_callback(&self, callback_id: &str) -> Result<(), HeraldError> {
            // Acks succeed even when sends are failing.
            self.calls.lock().unwrap().push(Call::Ack {
                callback_id: callback_id.to_string(),
            });
            Ok(())
        }

        async fn stop(&self) -> Result<(), HeraldError> {
            Ok(())
        }
    }

    fn test_gateway(mock: Arc<MockTransport>) -> Gateway {
        let config = TelegramConfig {
            bot_token: "token".to_string(),
            operator_id: OP,
            channel_id: CHANNEL,
        };
        Gateway::new(mock, &config)
    }

    fn text_msg(sender: i64, text: &str) -> InboundEvent {
        InboundEvent::Message {
            sender_id: sender,
            chat_id: CHAT,
            text: Some(text.to_string()),
            media: MediaReference::None,
        }
    }

    fn media_msg(media: MediaReference) -> InboundEvent {
        InboundEvent::Message {
            sender_id: OP,
            chat_id: CHAT,
            text: None,
            media,
        }
    }

    fn callback(message_id: i64, data: &str) -> InboundEvent {
        InboundEvent::Callback {
            sender_id: OP,
            chat_id: CHAT,
            message_id,
            callback_id: "cbq1".to_string(),
            data: data.to_string(),
        }
    }

    async fn drive_to_confirm(gw: &mut Gateway) {
        gw.handle_event(text_msg(OP, "/post")).await;
        gw.handle_event(text_msg(OP, "Hello")).await;
        gw.handle_event(text_msg(OP, "/skip")).await;
        gw.handle_event(text_msg(OP, "X - http://x.com")).await;
    }

    #[tokio::test]
    async fn test_publish_flow_end_to_end() {
        let mock = Arc::new(MockTransport::default());
        let mut gw = test_gateway(mock.clone());

        drive_to_confirm(&mut gw).await;
        assert_eq!(gw.sessions.session(OP).state, WizardState::AwaitingConfirm);

        // Preview went to the operator chat with the drafted text and grid.
        let calls = mock.calls();
        let preview = calls
            .iter()
            .find(|c| {
                matches!(c, Call::Text { chat_id, text, buttons: Some(_) }
                    if *chat_id == CHAT && text == "Hello")
            })
            .expect("preview send to operator chat");
        let Call::Text {
            buttons: Some(grid),
            ..
        } = preview
        else {
            unreachable!();
        };
        assert_eq!(grid.rows.len(), 1);
        assert!(calls.iter().any(|c| {
            matches!(c, Call::Choice { chat_id, data, .. }
                if *chat_id == CHAT && data == &["publish", "cancel"])
        }));

        gw.handle_event(callback(55, "publish")).await;

        // Exactly one send to the channel, identical text and buttons.
        let calls = mock.calls();
        let channel_sends: Vec<_> = calls
            .iter()
            .filter(|c| {
                matches!(c, Call::Text { chat_id, .. }
                    | Call::Photo { chat_id, .. }
                    | Call::Video { chat_id, .. } if *chat_id == CHANNEL)
            })
            .collect();
        assert_eq!(channel_sends.len(), 1);
        let Call::Text {
            text,
            buttons: Some(grid),
            ..
        } = channel_sends[0]
        else {
            panic!("expected text send to channel, got {:?}", channel_sends[0]);
        };
        assert_eq!(text, "Hello");
        assert_eq!(grid.rows[0][0].url, "http://x.com");

        // Confirm prompt edited to the success text; wizard back to Idle.
        assert!(calls.iter().any(|c| {
            matches!(c, Call::Edit { chat_id, message_id, text }
                if *chat_id == CHAT && *message_id == 55 && text == PUBLISHED_TEXT)
        }));
        assert!(calls
            .iter()
            .any(|c| matches!(c, Call::Ack { callback_id } if callback_id == "cbq1")));
        assert_eq!(gw.sessions.session(OP).state, WizardState::Idle);
    }

    #[tokio::test]
    async fn test_cancel_flow_sends_nothing_to_channel() {
        let mock = Arc::new(MockTransport::default());
        let mut gw = test_gateway(mock.clone());

        drive_to_confirm(&mut gw).await;
        gw.handle_event(callback(55, "cancel")).await;

        let calls = mock.calls();
        assert!(!calls.iter().any(|c| {
            matches!(c, Call::Text { chat_id, .. }
                | Call::Photo { chat_id, .. }
                | Call::Video { chat_id, .. } if *chat_id == CHANNEL)
        }));
        assert!(calls.iter().any(|c| {
            matches!(c, Call::Edit { message_id, text, .. }
                if *message_id == 55 && text == CANCELLED_TEXT)
        }));
        assert_eq!(gw.sessions.session(OP).state, WizardState::Idle);
    }

    #[tokio::test]
    async fn test_photo_draft_published_as_photo() {
        let mock = Arc::new(MockTransport::default());
        let mut gw = test_gateway(mock.clone());

        gw.handle_event(text_msg(OP, "/post")).await;
        gw.handle_event(text_msg(OP, "Caption")).await;
        gw.handle_event(media_msg(MediaReference::Photo {
            file_id: "file9".to_string(),
        }))
        .await;
        gw.handle_event(text_msg(OP, "X - http://x.com")).await;
        gw.handle_event(callback(55, "publish")).await;

        let calls = mock.calls();
        assert!(calls.iter().any(|c| {
            matches!(c, Call::Photo { chat_id, file_id, caption, buttons: Some(_) }
                if *chat_id == CHANNEL && file_id == "file9" && caption == "Caption")
        }));
    }

    #[tokio::test]
    async fn test_unauthorized_sender_dropped_silently() {
        let mock = Arc::new(MockTransport::default());
        let mut gw = test_gateway(mock.clone());

        gw.handle_event(text_msg(999, "/post")).await;
        gw.handle_event(InboundEvent::Callback {
            sender_id: 999,
            chat_id: CHAT,
            message_id: 1,
            callback_id: "cbq9".to_string(),
            data: "publish".to_string(),
        })
        .await;

        assert!(mock.calls().is_empty());
        assert_eq!(gw.sessions.session(OP).state, WizardState::Idle);
    }

    #[tokio::test]
    async fn test_malformed_buttons_reprompt_keeps_state() {
        let mock = Arc::new(MockTransport::default());
        let mut gw = test_gateway(mock.clone());

        gw.handle_event(text_msg(OP, "/post")).await;
        gw.handle_event(text_msg(OP, "Hello")).await;
        gw.handle_event(text_msg(OP, "/skip")).await;
        gw.handle_event(text_msg(OP, "NoSeparatorHere")).await;

        let calls = mock.calls();
        let Some(Call::Text { text, .. }) = calls.last() else {
            panic!("expected an error reply");
        };
        assert!(text.contains("Malformed button line: NoSeparatorHere"));
        assert_eq!(gw.sessions.session(OP).state, WizardState::AwaitingButtons);

        // Resending a valid grid continues the wizard.
        gw.handle_event(text_msg(OP, "X - http://x.com")).await;
        assert_eq!(gw.sessions.session(OP).state, WizardState::AwaitingConfirm);
    }

    #[tokio::test]
    async fn test_reentrant_post_restarts_wizard() {
        let mock = Arc::new(MockTransport::default());
        let mut gw = test_gateway(mock.clone());

        gw.handle_event(text_msg(OP, "/post")).await;
        gw.handle_event(text_msg(OP, "old")).await;
        gw.handle_event(text_msg(OP, "/skip")).await;
        assert_eq!(gw.sessions.session(OP).state, WizardState::AwaitingButtons);

        gw.handle_event(text_msg(OP, "/post")).await;
        assert_eq!(gw.sessions.session(OP).state, WizardState::AwaitingText);
        let Some(Call::Text { text, .. }) = mock.calls().last().cloned() else {
            panic!("expected a prompt");
        };
        assert_eq!(text, PROMPT_TEXT);
    }

    #[tokio::test]
    async fn test_delivery_failure_resets_to_idle() {
        let mock = Arc::new(MockTransport::default());
        let mut gw = test_gateway(mock.clone());

        gw.handle_event(text_msg(OP, "/post")).await;
        gw.handle_event(text_msg(OP, "Hello")).await;
        gw.handle_event(text_msg(OP, "/skip")).await;

        // Preview delivery fails; the wizard resets instead of crashing.
        mock.fail_sends.store(true, Ordering::Relaxed);
        gw.handle_event(text_msg(OP, "X - http://x.com")).await;
        assert_eq!(gw.sessions.session(OP).state, WizardState::Idle);
    }

    #[tokio::test]
    async fn test_start_greeting_and_unknown_callback_ignored() {
        let mock = Arc::new(MockTransport::default());
        let mut gw = test_gateway(mock.clone());

        gw.handle_event(text_msg(OP, "/start")).await;
        let Some(Call::Text { text, .. }) = mock.calls().last().cloned() else {
            panic!("expected greeting");
        };
        assert!(text.contains("/post"));
        assert_eq!(gw.sessions.session(OP).state, WizardState::Idle);

        // Unknown callback data is acked but drives no transition.
        gw.handle_event(callback(1, "bogus")).await;
        assert_eq!(gw.sessions.session(OP).state, WizardState::Idle);
        assert!(matches!(mock.calls().last(), Some(Call::Ack { .. })));
    }
}
