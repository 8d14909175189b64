use std::{collections::HashMap, hash::Hash, path::PathBuf, sync::Arc};
use async_trait::async_trait;
use serde_json::Value;
use tokio::{fs, sync::RwLock};
use tracing::debug;

use super::DurableStore;
use crate::errors::ServiceError;

fn io_err(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// Generic JSON file-backed key-value map store.
///
/// Persists a `HashMap<K, V>` to a JSON file after every write. The file is
/// replaced via write-to-temp + rename so a crash never leaves it half written.
pub struct JsonMapStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone + PartialEq,
{
    /// Initialize the store from a path. Creates the file with an empty map if
    /// missing; an unreadable or corrupt file is an error rather than silently
    /// starting empty.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(io_err)?;
            }
        }

        let map: HashMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ServiceError::Storage(format!("corrupt store file {}: {e}", file_path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<K, V> = HashMap::new();
                fs::write(&file_path, serde_json::to_vec(&empty)?).await.map_err(io_err)?;
                empty
            }
            Err(e) => return Err(io_err(e)),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path }))
    }

    /// Write `map` to disk. Callers hold the write lock, so saves never interleave.
    async fn persist(&self, map: &HashMap<K, V>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(map)?;
        let tmp = self.file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(io_err)?;
        fs::rename(&tmp, &self.file_path).await.map_err(io_err)?;
        debug!(path = %self.file_path.display(), "store persisted");
        Ok(())
    }

    /// Apply `change` to a copy of the map, persist the copy, and only then
    /// make it visible. A failed save leaves memory matching the file.
    async fn commit<R>(&self, change: impl FnOnce(&mut HashMap<K, V>) -> R) -> Result<R, ServiceError> {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        let out = change(&mut next);
        self.persist(&next).await?;
        *map = next;
        Ok(out)
    }

    /// List all entries as `(key, value)` pairs.
    pub async fn list(&self) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        self.commit(|map| {
            map.insert(key, value);
        })
        .await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, ServiceError> {
        self.commit(|map| map.remove(key).is_some()).await
    }

    /// Replace the value for `key` only if it currently equals `expected`.
    pub async fn compare_and_swap(&self, key: K, expected: Option<&V>, value: V) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        if map.get(&key) != expected {
            return Ok(false);
        }
        let mut next = map.clone();
        next.insert(key, value);
        self.persist(&next).await?;
        *map = next;
        Ok(true)
    }
}

/// File-backed [`DurableStore`]: one JSON document per key, all keys in a
/// single file.
#[derive(Clone)]
pub struct JsonFileStore {
    store: Arc<JsonMapStore<String, Value>>,
}

impl JsonFileStore {
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, Value>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl DurableStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, ServiceError> {
        Ok(self.store.get(&key.to_string()).await)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ServiceError> {
        self.store.insert(key.to_string(), value).await
    }

    async fn list(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.store.list().await.into_iter().map(|(k, _)| k).collect())
    }

    async fn compare_and_set(&self, key: &str, expected: Option<Value>, value: Value) -> Result<bool, ServiceError> {
        self.store.compare_and_swap(key.to_string(), expected.as_ref(), value).await
    }
}
