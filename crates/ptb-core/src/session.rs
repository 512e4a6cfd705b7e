//! Per-user conversation state and draft fields.
//!
//! Every field lives under `"<user>_<field>"` in the key-value store. Absent
//! keys are meaningful: no state means [`SessionState::Idle`], no draft field
//! means "not provided yet".

use std::{fmt, sync::Arc};

use crate::{
    domain::{GeoPoint, UserId},
    place::DraftPlace,
    store::KeyValueStore,
    Result,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SessionState {
    #[default]
    Idle,
    Adding,
    SearchingNearby,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Adding => "adding",
            SessionState::SearchingNearby => "nearby",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "idle" => Some(SessionState::Idle),
            "adding" => Some(SessionState::Adding),
            "nearby" => Some(SessionState::SearchingNearby),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    State,
    Location,
    Name,
    Photo,
    Radius,
}

impl Field {
    fn suffix(self) -> &'static str {
        match self {
            Field::State => "state",
            Field::Location => "geo",
            Field::Name => "name",
            Field::Photo => "img",
            Field::Radius => "dis",
        }
    }
}

fn key(user: UserId, field: Field) -> String {
    format!("{user}_{}", field.suffix())
}

/// Typed access to a user's session fields.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn state(&self, user: UserId) -> Result<SessionState> {
        let Some(raw) = self.kv.get(&key(user, Field::State)).await? else {
            return Ok(SessionState::Idle);
        };
        Ok(SessionState::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(%user, state = %raw, "unknown stored state, treating as idle");
            SessionState::Idle
        }))
    }

    pub async fn set_state(&self, user: UserId, state: SessionState) -> Result<()> {
        self.kv.set(&key(user, Field::State), state.as_str()).await
    }

    pub async fn draft(&self, user: UserId) -> Result<DraftPlace> {
        let photo = self.kv.get(&key(user, Field::Photo)).await?;
        let name = self.kv.get(&key(user, Field::Name)).await?;
        let location = self
            .kv
            .get(&key(user, Field::Location))
            .await?
            .and_then(|raw| GeoPoint::parse(&raw));
        Ok(DraftPlace {
            photo,
            name,
            location,
        })
    }

    pub async fn set_draft_location(&self, user: UserId, point: GeoPoint) -> Result<()> {
        self.kv
            .set(&key(user, Field::Location), &point.to_string())
            .await
    }

    pub async fn set_draft_name(&self, user: UserId, name: &str) -> Result<()> {
        self.kv.set(&key(user, Field::Name), name).await
    }

    pub async fn set_draft_photo(&self, user: UserId, photo: &str) -> Result<()> {
        self.kv.set(&key(user, Field::Photo), photo).await
    }

    pub async fn clear_draft(&self, user: UserId) -> Result<()> {
        for field in [Field::Name, Field::Photo, Field::Location] {
            self.kv.delete(&key(user, field)).await?;
        }
        Ok(())
    }

    /// Pending search radius in meters.
    pub async fn radius(&self, user: UserId) -> Result<Option<u64>> {
        Ok(self
            .kv
            .get(&key(user, Field::Radius))
            .await?
            .and_then(|raw| raw.trim().parse::<u64>().ok()))
    }

    pub async fn set_radius(&self, user: UserId, meters: u64) -> Result<()> {
        self.kv
            .set(&key(user, Field::Radius), &meters.to_string())
            .await
    }

    pub async fn clear_radius(&self, user: UserId) -> Result<()> {
        self.kv.delete(&key(user, Field::Radius)).await
    }
}
