use std::{collections::HashMap, sync::Arc};

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tokio::sync::{Mutex, OwnedMutexGuard};

use ptb_core::{
    bot::PlaceBot,
    config::Config,
    messaging::{
        port::Notifier,
        throttled::{ThrottleConfig, ThrottledNotifier},
    },
    store::Store,
};

use crate::handlers;
use crate::TelegramNotifier;

#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<PlaceBot>,
    pub chat_locks: Arc<ChatLocks>,
}

/// One async mutex per chat, so a chat's updates are processed one at a time.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

pub async fn run_polling<S: Store + 'static>(
    cfg: Arc<Config>,
    store: Arc<S>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Basic startup info.
    match bot.get_me().await {
        Ok(me) => tracing::info!("ptb started: @{}", me.username()),
        Err(e) => tracing::warn!("could not fetch bot identity: {e}"),
    }
    match &cfg.store_file {
        Some(path) => tracing::info!("place store: {}", path.display()),
        None => tracing::info!("place store: in-memory (set PLACES_STORE_FILE to persist)"),
    }

    // Listing and nearby results fan out into several sends; throttle them.
    let raw_notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(bot.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(ThrottledNotifier::new(
        raw_notifier,
        ThrottleConfig::from(cfg.as_ref()),
    ));

    let state = Arc::new(AppState {
        bot: Arc::new(PlaceBot::new(store, notifier, cfg.list_limit)),
        chat_locks: Arc::new(ChatLocks::default()),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
