use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::UserId,
    store::{resolve_range, KeyValueStore, ListStore},
    Result,
};

/// Plain in-process contents of a store.
#[derive(Clone, Debug, Default)]
pub(crate) struct Snapshot {
    pub values: BTreeMap<String, String>,
    pub lists: BTreeMap<i64, VecDeque<String>>,
}

impl Snapshot {
    pub fn range(&self, user: UserId, start: i64, end: i64) -> Vec<String> {
        let Some(list) = self.lists.get(&user.0) else {
            return Vec::new();
        };
        match resolve_range(list.len(), start, end) {
            Some(r) => list.range(r).cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn prepend(&mut self, user: UserId, value: &str) {
        self.lists
            .entry(user.0)
            .or_default()
            .push_front(value.to_string());
    }
}

/// Volatile store: everything is lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every flat key currently set (test/diagnostic helper).
    pub async fn keys(&self) -> HashMap<String, String> {
        self.inner
            .lock()
            .await
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().await.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .lock()
            .await
            .values
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.lock().await.values.remove(key);
        Ok(())
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn prepend(&self, user: UserId, value: &str) -> Result<()> {
        self.inner.lock().await.prepend(user, value);
        Ok(())
    }

    async fn range_from_head(&self, user: UserId, start: i64, end: i64) -> Result<Vec<String>> {
        Ok(self.inner.lock().await.range(user, start, end))
    }

    async fn delete_all(&self, user: UserId) -> Result<()> {
        self.inner.lock().await.lists.remove(&user.0);
        Ok(())
    }
}
