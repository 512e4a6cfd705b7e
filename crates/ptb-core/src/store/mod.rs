//! Storage ports for per-user session fields and committed place lists.
//!
//! Values are plain strings; typed access lives in [`crate::session`] and
//! [`crate::places`].

pub mod file;
pub mod memory;

use std::ops::RangeInclusive;

use async_trait::async_trait;

use crate::{domain::UserId, Result};

/// Flat key-value contract (`get`/`set`/`delete`).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Per-user ordered list contract, newest entry at the head.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn prepend(&self, user: UserId, value: &str) -> Result<()>;

    /// Inclusive range from the head. Negative indexes count from the tail,
    /// so `end = -1` means "to the last element".
    async fn range_from_head(&self, user: UserId, start: i64, end: i64) -> Result<Vec<String>>;

    async fn delete_all(&self, user: UserId) -> Result<()>;
}

/// Everything the bot needs from a backend.
pub trait Store: KeyValueStore + ListStore {}

impl<T: KeyValueStore + ListStore> Store for T {}

/// Resolve an inclusive `[start, end]` range over a list of `len` elements.
///
/// Out-of-range bounds clamp; an empty result is `None`.
pub(crate) fn resolve_range(len: usize, start: i64, end: i64) -> Option<RangeInclusive<usize>> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let end = if end < 0 { len + end } else { end.min(len - 1) };
    if len == 0 || start > end || start >= len {
        return None;
    }
    Some(start as usize..=end as usize)
}
