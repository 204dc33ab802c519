//! The post wizard: an explicit transition-table state machine.
//!
//! Each operator owns one [`WizardSession`]; applying a [`Trigger`] either
//! advances the session and yields a [`StepAction`] for the gateway to
//! perform, or leaves it untouched when the input does not match the
//! current step.

use crate::draft::{MediaReference, PostDraft};
use crate::error::HeraldError;
use crate::keyboard::parse_buttons;
use std::collections::HashMap;

/// Wizard steps, in conversation order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WizardState {
    #[default]
    Idle,
    AwaitingText,
    AwaitingMedia,
    AwaitingButtons,
    AwaitingConfirm,
}

/// Confirm-step choices, carried as callback data on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Publish,
    Cancel,
}

impl Choice {
    /// Parse callback data; unknown values are ignored by the caller.
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "publish" => Some(Self::Publish),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }

    pub fn as_data(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Cancel => "cancel",
        }
    }
}

/// Input shapes the wizard reacts to.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// The `/post` command.
    Post,
    /// The `/skip` command.
    Skip,
    /// A plain text message.
    Text(String),
    /// A message carrying a photo or video.
    Media(MediaReference),
    /// A confirm-step button press.
    Choice(Choice),
}

/// What the gateway must do after a successful transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAction {
    /// Ask the operator for the post text.
    PromptText,
    /// Ask for a photo/video or `/skip`.
    PromptMedia,
    /// Ask for the button grid.
    PromptButtons,
    /// Show a preview of the draft and ask for confirmation.
    Preview(PostDraft),
    /// Deliver the draft to the channel.
    Publish(PostDraft),
    /// The operator cancelled; nothing was sent.
    Cancelled,
}

/// One operator's wizard: the current step plus the draft under construction.
#[derive(Debug, Clone, Default)]
pub struct WizardSession {
    pub state: WizardState,
    draft: PostDraft,
}

impl WizardSession {
    /// Apply one trigger to the session.
    ///
    /// `Ok(None)` means the input does not match the current step and is
    /// silently ignored. A [`HeraldError::ButtonParse`] leaves the state
    /// unchanged so the operator can resend the grid. `/post` restarts the
    /// wizard from any state, discarding the in-flight draft.
    pub fn apply(&mut self, trigger: Trigger) -> Result<Option<StepAction>, HeraldError> {
        match (self.state, trigger) {
            (_, Trigger::Post) => {
                self.draft = PostDraft::default();
                self.state = WizardState::AwaitingText;
                Ok(Some(StepAction::PromptText))
            }
            (WizardState::AwaitingText, Trigger::Text(text)) => {
                self.draft.text = text;
                self.state = WizardState::AwaitingMedia;
                Ok(Some(StepAction::PromptMedia))
            }
            (WizardState::AwaitingMedia, Trigger::Skip) => {
                self.draft.media = MediaReference::None;
                self.state = WizardState::AwaitingButtons;
                Ok(Some(StepAction::PromptButtons))
            }
            (WizardState::AwaitingMedia, Trigger::Media(media)) => {
                self.draft.media = media;
                self.state = WizardState::AwaitingButtons;
                Ok(Some(StepAction::PromptButtons))
            }
            (WizardState::AwaitingButtons, Trigger::Text(raw)) => {
                self.draft.buttons = parse_buttons(&raw)?;
                self.state = WizardState::AwaitingConfirm;
                Ok(Some(StepAction::Preview(self.draft.clone())))
            }
            (WizardState::AwaitingConfirm, Trigger::Choice(Choice::Publish)) => {
                let draft = std::mem::take(&mut self.draft);
                self.state = WizardState::Idle;
                Ok(Some(StepAction::Publish(draft)))
            }
            (WizardState::AwaitingConfirm, Trigger::Choice(Choice::Cancel)) => {
                self.draft = PostDraft::default();
                self.state = WizardState::Idle;
                Ok(Some(StepAction::Cancelled))
            }
            _ => Ok(None),
        }
    }

    /// Discard the draft and return to Idle (used after delivery failures).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-operator session store.
///
/// Exactly one operator is authorized in practice, but sessions are keyed
/// explicitly so the machine carries no hidden global state.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<i64, WizardSession>,
}

impl SessionStore {
    /// The session for `operator_id`, created Idle on first access.
    pub fn session(&mut self, operator_id: i64) -> &mut WizardSession {
        self.sessions.entry(operator_id).or_default()
    }
}
