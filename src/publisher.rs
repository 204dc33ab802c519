//! Renders a draft into the matching outbound send.

use herald_core::{
    draft::{MediaReference, PostDraft},
    error::HeraldError,
    traits::Transport,
};

/// Deliver a draft to a destination chat.
///
/// Three-way dispatch on the media variant; no fallback, no retry. An
/// empty button grid attaches no keyboard. Transport rejection surfaces
/// as [`HeraldError::Transport`].
pub async fn send_post(
    transport: &dyn Transport,
    chat_id: i64,
    draft: &PostDraft,
) -> Result<(), HeraldError> {
    let buttons = (!draft.buttons.is_empty()).then_some(&draft.buttons);

    match &draft.media {
        MediaReference::Photo { file_id } => {
            transport
                .send_photo(chat_id, file_id, &draft.text, buttons)
                .await?;
        }
        MediaReference::Video { file_id } => {
            transport
                .send_video(chat_id, file_id, &draft.text, buttons)
                .await?;
        }
        MediaReference::None => {
            transport.send_text(chat_id, &draft.text, buttons).await?;
        }
    }

    Ok(())
}
