//! The in-progress post assembled by the wizard.

use crate::keyboard::ButtonGrid;
use serde::{Deserialize, Serialize};

/// Reference to an attached media file.
///
/// Carries the transport-level file handle; captured once per wizard run
/// and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaReference {
    #[default]
    None,
    Photo {
        file_id: String,
    },
    Video {
        file_id: String,
    },
}

/// A draft post: text, optional media, parsed buttons.
///
/// Built incrementally across wizard steps and discarded on cancel,
/// publish, or restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub text: String,
    pub media: MediaReference,
    pub buttons: ButtonGrid,
}
