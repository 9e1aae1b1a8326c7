//! Redis cache store.

use async_trait::async_trait;
use common::{AppError, AppResult, CacheConfig};
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};

use super::CacheStore;

/// Redis store with connection pooling.
///
/// Every key is written under the configured prefix. `flush` removes the
/// keys under that prefix and refuses to run without one.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    prefix: String,
}

impl RedisStore {
    /// Connect to Redis, returning an error instead of panicking.
    pub async fn connect(config: &CacheConfig) -> AppResult<Self> {
        let client = Client::open(config.url.as_str()).map_err(cache_error)?;
        let connection = ConnectionManager::new(client).await.map_err(cache_error)?;

        tracing::info!(prefix = %config.prefix, "Redis cache connected");

        Ok(Self {
            connection,
            prefix: config.prefix.clone(),
        })
    }

    /// Get the connection manager for direct Redis operations.
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Delete all keys matching a pattern.
    /// Uses UNLINK for non-blocking deletion, falling back to DEL.
    async fn delete_pattern(&self, pattern: &str) -> AppResult<u64> {
        let mut conn = self.connection.clone();
        let keys: Vec<String> = conn.keys(pattern).await.map_err(cache_error)?;

        if keys.is_empty() {
            return Ok(0);
        }

        let unlinked: Result<i64, RedisError> =
            redis::cmd("UNLINK").arg(&keys).query_async(&mut conn).await;

        let deleted = match unlinked {
            Ok(count) => count,
            Err(_) => conn.del(&keys).await.map_err(cache_error)?,
        };

        Ok(deleted.max(0) as u64)
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        conn.get(self.prefixed(key)).await.map_err(cache_error)
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.connection.clone();
        let keys: Vec<String> = keys.iter().map(|key| self.prefixed(key)).collect();

        // MGET always answers with an array, even for a single key
        redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await
            .map_err(cache_error)
    }

    async fn set_forever(&self, key: &str, value: String) -> AppResult<()> {
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(self.prefixed(key), value)
            .await
            .map_err(cache_error)
    }

    async fn forget(&self, key: &str) -> AppResult<bool> {
        let mut conn = self.connection.clone();
        let removed: i64 = conn.del(self.prefixed(key)).await.map_err(cache_error)?;
        Ok(removed > 0)
    }

    async fn flush(&self) -> AppResult<()> {
        let deleted = self.delete_pattern(&flush_pattern(&self.prefix)?).await?;
        tracing::info!(prefix = %self.prefix, deleted, "Flushed cache");
        Ok(())
    }
}

/// Pattern matching every key under `prefix`. An empty prefix would match the
/// whole database.
fn flush_pattern(prefix: &str) -> AppResult<String> {
    if prefix.is_empty() {
        return Err(AppError::invalid_argument(
            "Refusing to flush a Redis cache without a key prefix",
        ));
    }
    Ok(format!("{}*", prefix))
}

/// Convert Redis error to AppError.
fn cache_error(e: RedisError) -> AppError {
    tracing::error!("Redis error: {}", e);
    AppError::Cache(e)
}
