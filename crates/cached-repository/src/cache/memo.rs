//! Per-instance memo in front of a shared cache store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use common::AppResult;

use super::CacheStore;

/// Remembers every value read from or written to the wrapped store.
///
/// Writes and deletions go to both layers. Entries written to the shared store
/// by other processes are not seen once a key has been memoized.
#[derive(Debug)]
pub struct LocalMemo<S> {
    inner: S,
    seen: Mutex<HashMap<String, Option<String>>>,
}

impl<S: CacheStore> LocalMemo<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn seen(&self) -> MutexGuard<'_, HashMap<String, Option<String>>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<S: CacheStore> CacheStore for LocalMemo<S> {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let memoized = self.seen().get(key).cloned();
        if let Some(value) = memoized {
            return Ok(value);
        }

        let value = self.inner.get(key).await?;
        self.seen().insert(key.to_string(), value.clone());
        Ok(value)
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        let mut values: Vec<Option<Option<String>>> = {
            let seen = self.seen();
            keys.iter().map(|key| seen.get(key).cloned()).collect()
        };

        let unknown: Vec<String> = keys
            .iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| key.clone())
            .collect();

        if !unknown.is_empty() {
            let fetched = self.inner.get_many(&unknown).await?;
            let mut seen = self.seen();
            let mut fetched = unknown.into_iter().zip(fetched);
            for slot in values.iter_mut().filter(|slot| slot.is_none()) {
                if let Some((key, value)) = fetched.next() {
                    seen.insert(key, value.clone());
                    *slot = Some(value);
                }
            }
        }

        Ok(values.into_iter().map(Option::flatten).collect())
    }

    async fn set_forever(&self, key: &str, value: String) -> AppResult<()> {
        self.inner.set_forever(key, value.clone()).await?;
        self.seen().insert(key.to_string(), Some(value));
        Ok(())
    }

    async fn forget(&self, key: &str) -> AppResult<bool> {
        let removed = self.inner.forget(key).await?;
        self.seen().insert(key.to_string(), None);
        Ok(removed)
    }

    async fn flush(&self) -> AppResult<()> {
        self.inner.flush().await?;
        self.seen().clear();
        Ok(())
    }
}
