//! Cached post repository.

use cached_repository::{
    BaseRepository, CacheKeys, CacheStore, CachedRepository, RepositoryOptions, SeaOrmSource,
};
use domain::FieldValue;
use sea_orm::DatabaseConnection;

use super::entities::post;

pub type PostSource = SeaOrmSource<post::Entity, post::ActiveModel>;

pub type PostRepository<S> = CachedRepository<post::Model, PostSource, S>;

/// Cache keys for posts. Lookups by text are cached and dropped with the post.
pub struct PostCacheKeys;

impl CacheKeys<post::Model> for PostCacheKeys {
    fn field_keys_to_forget(&self, post: &post::Model) -> Vec<String> {
        self.field("text", &FieldValue::from(post.text.as_str()))
            .into_iter()
            .collect()
    }
}

pub fn post_repository<S: CacheStore>(
    db: DatabaseConnection,
    cache: S,
    options: RepositoryOptions,
) -> PostRepository<S> {
    let base = BaseRepository::new(PostSource::new(db)).with_options(options);
    CachedRepository::new(base, cache).with_keys(PostCacheKeys)
}
