use async_trait::async_trait;

use crate::{
    domain::{GeoPoint, UserId},
    messaging::types::ActionSet,
    Result,
};

/// Outbound channel to the user.
///
/// Telegram is the only implementation; sends are fire-and-forget from the
/// bot's point of view and never retried by it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_text(&self, user: UserId, text: &str, actions: Option<&ActionSet>)
        -> Result<()>;

    async fn send_photo(&self, user: UserId, photo: &str, caption: &str) -> Result<()>;

    async fn send_location(&self, user: UserId, point: GeoPoint) -> Result<()>;
}
