use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::DurableStore;
use crate::errors::ServiceError;

/// Process-local [`DurableStore`]; contents are lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, Value>>,
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, ServiceError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), ServiceError> {
        self.inner.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.inner.read().await.keys().cloned().collect())
    }

    async fn compare_and_set(&self, key: &str, expected: Option<Value>, value: Value) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        if map.get(key) != expected.as_ref() {
            return Ok(false);
        }
        map.insert(key.to_string(), value);
        Ok(true)
    }
}
