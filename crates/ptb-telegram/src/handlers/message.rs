use std::sync::Arc;

use teloxide::prelude::*;

use ptb_core::{
    domain::{GeoPoint, UserId},
    messaging::types::{parse_command, IncomingUpdate, UpdateKind},
};

use crate::router::AppState;

use super::dispatch;

/// Classify a message by content. Commands win over plain text.
fn message_kind(
    text: Option<&str>,
    location: Option<(f64, f64)>,
    photo_ids: &[&str],
) -> Option<UpdateKind> {
    if let Some(text) = text {
        return Some(match parse_command(text) {
            Some(cmd) => UpdateKind::Command(cmd),
            None => UpdateKind::Text(text.to_string()),
        });
    }
    if let Some((lat, lon)) = location {
        return Some(UpdateKind::Location(GeoPoint::new(lat, lon)));
    }
    // Telegram lists sizes smallest first; the first one is stored.
    photo_ids
        .first()
        .map(|id| UpdateKind::Photo((*id).to_string()))
}

pub async fn handle_message(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let location = msg.location().map(|l| (l.latitude, l.longitude));
    let photo_ids: Vec<&str> = msg
        .photo()
        .map(|sizes| sizes.iter().map(|p| p.file.id.as_str()).collect())
        .unwrap_or_default();

    let Some(kind) = message_kind(msg.text(), location, &photo_ids) else {
        tracing::debug!(chat = msg.chat.id.0, "ignoring unsupported message");
        return Ok(());
    };

    dispatch(&state, IncomingUpdate::new(UserId(msg.chat.id.0), kind)).await;
    Ok(())
}
