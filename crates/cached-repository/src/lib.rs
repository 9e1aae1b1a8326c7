//! Repository layer with a read-through, write-invalidate cache in front of a data source.
//!
//! - [`BaseRepository`] talks to a [`DataSource`] and fires lifecycle hooks.
//! - [`CachedRepository`] answers key and field lookups from a [`CacheStore`] first.
//! - [`CachedSoftDeleteRepository`] keeps one cached entry per key regardless of
//!   deletion state and filters trashed records when answering.

pub mod base;
pub mod cache;
pub mod cached;
pub mod counter;
pub mod listener;
pub mod not_found;
pub mod soft_delete;
pub mod source;
pub mod traits;

pub use base::BaseRepository;
pub use cache::{CacheStore, LocalMemo, MemoryStore, RedisStore};
pub use cached::{CacheKeys, CachedRepository, DefaultCacheKeys};
pub use counter::update_parent_count;
pub use listener::RepositoryListener;
pub use not_found::{NotFoundContext, NotFoundFactory, RepositoryOptions};
pub use soft_delete::CachedSoftDeleteRepository;
pub use source::{DataSource, Scope, SeaOrmSource};
pub use traits::{Repository, SoftDeleteRepository};

#[cfg(any(test, feature = "test-utils"))]
pub use cache::MockCacheStore;
