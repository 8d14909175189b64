//! Durable Store abstraction and typed per-component collections.
//!
//! The store is a flat key → JSON value map. Each component owns exactly one
//! key and reaches it through a [`Collection`], which adds typing, bounded
//! latency and optimistic concurrency on top of the raw store.

pub mod json_map_store;
pub mod memory;

use std::{future::Future, marker::PhantomData, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::errors::ServiceError;

pub use json_map_store::{JsonFileStore, JsonMapStore};
pub use memory::MemoryStore;

/// Key-value persistence consumed by every component. Each call must be
/// atomic per key.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, ServiceError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), ServiceError>;
    /// All keys currently present.
    async fn list(&self) -> Result<Vec<String>, ServiceError>;
    /// Write `value` only if the stored value still equals `expected`
    /// (`None` meaning "absent"). Returns whether the write happened.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<Value>,
        value: Value,
    ) -> Result<bool, ServiceError>;
}

/// Typed accessor over one store key holding a whole document `T`.
pub struct Collection<T> {
    store: Arc<dyn DurableStore>,
    key: &'static str,
    timeout: Duration,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(store: Arc<dyn DurableStore>, key: &'static str, timeout: Duration) -> Self {
        Self { store, key, timeout, _doc: PhantomData }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    async fn bounded<R>(&self, op: impl Future<Output = Result<R, ServiceError>>) -> Result<R, ServiceError> {
        tokio::time::timeout(self.timeout, op)
            .await
            .map_err(|_| ServiceError::Timeout(format!("store operation on '{}'", self.key)))?
    }

    async fn snapshot(&self) -> Result<(Option<Value>, T), ServiceError> {
        let raw = self.bounded(self.store.get(self.key)).await?;
        let doc = match &raw {
            Some(v) => serde_json::from_value(v.clone())?,
            None => T::default(),
        };
        Ok((raw, doc))
    }

    /// Read the current document (empty default when the key is absent).
    pub async fn load(&self) -> Result<T, ServiceError> {
        Ok(self.snapshot().await?.1)
    }

    /// Read, mutate and write back. Nothing is written when `f` fails; a
    /// concurrent write between read and write-back yields `Conflict`.
    pub async fn update<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut T) -> Result<R, ServiceError>,
    {
        let (raw, mut doc) = self.snapshot().await?;
        let out = f(&mut doc)?;
        let next = serde_json::to_value(&doc)?;
        let written = self.bounded(self.store.compare_and_set(self.key, raw, next)).await?;
        if !written {
            return Err(ServiceError::Conflict(format!("'{}' changed since it was read", self.key)));
        }
        Ok(out)
    }
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), key: self.key, timeout: self.timeout, _doc: PhantomData }
    }
}
