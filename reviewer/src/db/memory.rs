//! In-memory key-value backend

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KvStore;
use crate::error::StorageError;

/// Process-local store; contents are lost on restart
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<(String, String), Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(&(namespace.to_string(), key.to_string()))
            .cloned())
    }

    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.inner
            .write()
            .await
            .insert((namespace.to_string(), key.to_string()), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new();
        assert!(store.get("u", "history").await.unwrap().is_none());

        store.put("u", "history", vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get("u", "history").await.unwrap(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_clones_share_contents() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.put("u", "history", vec![9]).await.unwrap();
        assert_eq!(other.get("u", "history").await.unwrap(), Some(vec![9]));
    }
}
