//! Cache stores consulted by the cached repositories.
//!
//! A store maps string keys to JSON strings with no expiry. The cached
//! repositories own the key layout and the encoding of entries.

mod memo;
mod memory;
mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use common::AppResult;

pub use memo::LocalMemo;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Key-value store with no expiry.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Values for `keys`, in the same order.
    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>>;

    async fn set_forever(&self, key: &str, value: String) -> AppResult<()>;

    /// Remove a key, returning whether it was present.
    async fn forget(&self, key: &str) -> AppResult<bool>;

    /// Remove every key this store owns.
    async fn flush(&self) -> AppResult<()>;
}

#[async_trait]
impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        (**self).get(key).await
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        (**self).get_many(keys).await
    }

    async fn set_forever(&self, key: &str, value: String) -> AppResult<()> {
        (**self).set_forever(key, value).await
    }

    async fn forget(&self, key: &str) -> AppResult<bool> {
        (**self).forget(key).await
    }

    async fn flush(&self) -> AppResult<()> {
        (**self).flush().await
    }
}
