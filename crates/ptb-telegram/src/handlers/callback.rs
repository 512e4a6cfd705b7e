use std::sync::Arc;

use teloxide::prelude::*;

use ptb_core::{
    domain::UserId,
    messaging::types::{IncomingUpdate, UpdateKind},
};

use crate::router::AppState;

use super::dispatch;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let chat_id = q.message.as_ref().map(|m| m.chat.id);
    let data = q.data.clone().unwrap_or_default();

    // Always answer the callback query so the client stops its spinner.
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        tracing::warn!("failed to answer callback query: {e}");
    }

    let Some(chat_id) = chat_id else {
        return Ok(());
    };
    if data.is_empty() {
        return Ok(());
    }

    dispatch(
        &state,
        IncomingUpdate::new(UserId(chat_id.0), UpdateKind::Action(data)),
    )
    .await;
    Ok(())
}
