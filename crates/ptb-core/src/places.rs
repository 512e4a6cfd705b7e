//! Committed places per user.
//!
//! Records are encoded/decoded here so that nothing outside this module sees
//! the raw `photo;name;location` strings.

use std::sync::Arc;

use crate::{
    domain::UserId,
    place::Place,
    store::ListStore,
    Result,
};

#[derive(Clone)]
pub struct PlaceRepository {
    lists: Arc<dyn ListStore>,
}

impl PlaceRepository {
    pub fn new(lists: Arc<dyn ListStore>) -> Self {
        Self { lists }
    }

    /// Prepend a place to the user's list.
    pub async fn commit(&self, user: UserId, place: &Place) -> Result<()> {
        self.lists.prepend(user, &place.encode()).await
    }

    /// Up to `limit` most recent places, newest first. Corrupt records are skipped.
    pub async fn recent(&self, user: UserId, limit: usize) -> Result<Vec<Place>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let raw = self
            .lists
            .range_from_head(user, 0, limit as i64 - 1)
            .await?;
        Ok(decode_all(user, raw))
    }

    /// Every place of the user, newest first. Corrupt records are skipped.
    pub async fn all(&self, user: UserId) -> Result<Vec<Place>> {
        let raw = self.lists.range_from_head(user, 0, -1).await?;
        Ok(decode_all(user, raw))
    }

    pub async fn reset(&self, user: UserId) -> Result<()> {
        self.lists.delete_all(user).await
    }
}

fn decode_all(user: UserId, raw: Vec<String>) -> Vec<Place> {
    raw.into_iter()
        .filter_map(|record| match Place::decode(&record) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!(%user, record = %record, "skipping corrupt place: {e}");
                None
            }
        })
        .collect()
}
