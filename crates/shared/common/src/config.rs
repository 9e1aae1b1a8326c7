//! Shared configuration structures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a cached repository does when the cache store fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheFailurePolicy {
    /// Log the failure and continue as if the entry were absent
    #[default]
    FallThrough,
    /// Return the cache error to the caller
    Propagate,
}

impl FromStr for CacheFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fall-through" | "fallthrough" => Ok(CacheFailurePolicy::FallThrough),
            "propagate" => Ok(CacheFailurePolicy::Propagate),
            other => Err(format!("unknown cache failure policy `{}`", other)),
        }
    }
}

impl fmt::Display for CacheFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheFailurePolicy::FallThrough => write!(f, "fall-through"),
            CacheFailurePolicy::Propagate => write!(f, "propagate"),
        }
    }
}

/// Cache store backing the repositories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Process-local map, lost on restart
    #[default]
    Memory,
    Redis,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "redis" => Ok(CacheBackend::Redis),
            other => Err(format!("unknown cache backend `{}`", other)),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub url: String,
    /// Prepended to every key written to a shared store
    pub prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            url: "redis://127.0.0.1:6379".to_string(),
            prefix: String::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://blog.db?mode=rwc".to_string(),
            max_connections: 10,
            min_connections: 1,
        }
    }
}

/// Behaviour shared by every repository built from the same options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub cache_failures: CacheFailurePolicy,
    /// Wrap the cache store in a per-instance memo in front of the shared store
    pub use_local_memo: bool,
}
