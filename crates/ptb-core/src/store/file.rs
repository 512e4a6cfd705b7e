use std::{
    collections::{BTreeMap, VecDeque},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    domain::UserId,
    errors::Error,
    store::{memory::Snapshot, KeyValueStore, ListStore},
    Result,
};

#[derive(Debug, Serialize, Deserialize)]
struct StoreFileData {
    saved_at: String,
    values: BTreeMap<String, String>,
    lists: BTreeMap<i64, VecDeque<String>>,
}

/// Write-through store persisted as a JSON snapshot.
///
/// Every mutation rewrites the whole file (via a temp file + rename), so the
/// file on disk always holds a complete snapshot.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: Mutex<Snapshot>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let snapshot = load_store_file(&path)?.unwrap_or_default();
        tracing::info!(
            path = %path.display(),
            keys = snapshot.values.len(),
            users = snapshot.lists.len(),
            "opened place store"
        );
        Ok(Self {
            path,
            inner: Mutex::new(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let data = StoreFileData {
            saved_at: Utc::now().to_rfc3339(),
            values: snapshot.values.clone(),
            lists: snapshot.lists.clone(),
        };
        let txt = serde_json::to_string(&data)?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, txt).await?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Store {
                path: self.path.clone(),
                reason: format!("failed to replace snapshot: {e}"),
            })
    }
}

fn load_store_file(path: &Path) -> Result<Option<Snapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let txt = std::fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(None);
    }
    let data: StoreFileData = serde_json::from_str(&txt).map_err(|e| Error::Store {
        path: path.to_path_buf(),
        reason: format!("corrupt snapshot: {e}"),
    })?;
    Ok(Some(Snapshot {
        values: data.values,
        lists: data.lists,
    }))
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.lock().await.values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut snap = self.inner.lock().await;
        snap.values.insert(key.to_string(), value.to_string());
        self.persist(&snap).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut snap = self.inner.lock().await;
        if snap.values.remove(key).is_none() {
            return Ok(());
        }
        self.persist(&snap).await
    }
}

#[async_trait]
impl ListStore for FileStore {
    async fn prepend(&self, user: UserId, value: &str) -> Result<()> {
        let mut snap = self.inner.lock().await;
        snap.prepend(user, value);
        self.persist(&snap).await
    }

    async fn range_from_head(&self, user: UserId, start: i64, end: i64) -> Result<Vec<String>> {
        Ok(self.inner.lock().await.range(user, start, end))
    }

    async fn delete_all(&self, user: UserId) -> Result<()> {
        let mut snap = self.inner.lock().await;
        if snap.lists.remove(&user.0).is_none() {
            return Ok(());
        }
        self.persist(&snap).await
    }
}
