//! Telegram update handlers.
//!
//! Each handler is a small adapter that:
//! - converts the Telegram update into a core `IncomingUpdate`
//! - serializes work per chat
//! - hands the update to the core `PlaceBot` and logs failures

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use ptb_core::messaging::types::IncomingUpdate;

use crate::router::AppState;

mod callback;
mod message;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    message::handle_message(bot, msg, state).await
}

/// Run one update through the core. Failures end the update; nothing is retried.
async fn dispatch(state: &AppState, update: IncomingUpdate) {
    let user = update.user_id;
    let _guard = state.chat_locks.lock_chat(user.0).await;
    if let Err(e) = state.bot.handle(&update).await {
        tracing::error!(%user, "failed to handle update: {e}");
    }
}
