//! Telegram adapter (teloxide).
//!
//! This crate implements the `ptb-core` Notifier port over Telegram Bot API and
//! turns Telegram updates into core `IncomingUpdate`s.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use ptb_core::{
    domain::{GeoPoint, UserId},
    errors::Error,
    messaging::{port::Notifier, types::ActionSet},
    Result,
};

/// Buttons per keyboard row.
const ACTIONS_PER_ROW: usize = 2;

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(user: UserId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(user.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        tracing::warn!("telegram flood control, retrying after {d:?}");
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

/// Inline keyboard whose callback data is the action label itself.
pub fn action_keyboard(actions: &ActionSet) -> InlineKeyboardMarkup {
    let labels: Vec<&str> = actions.labels().collect();
    let rows: Vec<Vec<InlineKeyboardButton>> = labels
        .chunks(ACTIONS_PER_ROW)
        .map(|row| {
            row.iter()
                .map(|label| InlineKeyboardButton::callback(*label, *label))
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(
        &self,
        user: UserId,
        text: &str,
        actions: Option<&ActionSet>,
    ) -> Result<()> {
        let markup = actions.map(action_keyboard);
        self.with_retry(|| {
            let req = self.bot.send_message(Self::tg_chat(user), text.to_string());
            match &markup {
                Some(m) => req.reply_markup(m.clone()),
                None => req,
            }
        })
        .await?;
        Ok(())
    }

    async fn send_photo(&self, user: UserId, photo: &str, caption: &str) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .send_photo(Self::tg_chat(user), InputFile::file_id(photo.to_string()))
                .caption(caption.to_string())
        })
        .await?;
        Ok(())
    }

    async fn send_location(&self, user: UserId, point: GeoPoint) -> Result<()> {
        self.with_retry(|| {
            self.bot
                .send_location(Self::tg_chat(user), point.lat, point.lon)
        })
        .await?;
        Ok(())
    }
}
