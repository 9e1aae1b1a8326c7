//! In-memory cache store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::AppResult;
use tokio::sync::RwLock;

use super::CacheStore;

/// Process-local store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        let entries = self.entries.read().await;
        Ok(keys.iter().map(|key| entries.get(key).cloned()).collect())
    }

    async fn set_forever(&self, key: &str, value: String) -> AppResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn forget(&self, key: &str) -> AppResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn flush(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_forget() {
        let store = MemoryStore::new();
        store.set_forever("post:1", "{}".to_string()).await.unwrap();

        assert_eq!(store.get("post:1").await.unwrap(), Some("{}".to_string()));
        assert!(store.forget("post:1").await.unwrap());
        assert!(!store.forget("post:1").await.unwrap());
        assert_eq!(store.get("post:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_many_preserves_order() {
        let store = MemoryStore::new();
        store.set_forever("b", "2".to_string()).await.unwrap();

        let values = store
            .get_many(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        assert_eq!(values, vec![None, Some("2".to_string())]);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        other.set_forever("k", "v".to_string()).await.unwrap();

        assert_eq!(store.len().await, 1);
        store.flush().await.unwrap();
        assert!(other.is_empty().await);
    }
}
