//! Post service configuration.

use std::env;

use common::{CacheConfig, DatabaseConfig, RepositoryConfig};

/// Post service configuration.
#[derive(Debug, Clone, Default)]
pub struct PostServiceConfig {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub repository: RepositoryConfig,
}

impl PostServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database = DatabaseConfig {
            url: env::var("POST_SERVICE_DATABASE_URL")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or(defaults.database.url),
            max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database.max_connections),
            min_connections: parsed("DATABASE_MIN_CONNECTIONS")
                .unwrap_or(defaults.database.min_connections),
        };

        let cache = CacheConfig {
            backend: parsed("CACHE_BACKEND").unwrap_or(defaults.cache.backend),
            url: env::var("POST_SERVICE_REDIS_URL")
                .or_else(|_| env::var("REDIS_URL"))
                .unwrap_or(defaults.cache.url),
            prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.cache.prefix),
        };

        let repository = RepositoryConfig {
            cache_failures: parsed("CACHE_FAILURES")
                .unwrap_or(defaults.repository.cache_failures),
            use_local_memo: parsed("CACHE_LOCAL_MEMO")
                .unwrap_or(defaults.repository.use_local_memo),
        };

        Self {
            database,
            cache,
            repository,
        }
    }
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}
