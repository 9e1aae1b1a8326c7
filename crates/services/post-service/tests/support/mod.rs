//! Shared fixtures: an in-memory SQLite database with seeded posts and
//! comments, and a data source decorator counting queries.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cached_repository::{
    BaseRepository, CacheStore, CachedRepository, CachedSoftDeleteRepository, DataSource,
    MemoryStore, RepositoryOptions, Scope,
};
use chrono::Utc;
use common::AppResult;
use domain::{Cached, FieldValue, Record};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

use post_service_lib::infra::Migrator;
use post_service_lib::repository::entities::{comment, post};
use post_service_lib::repository::{CommentSource, PostCacheKeys, PostSource};

pub type Posts = CachedRepository<post::Model, CountingSource<PostSource>, Arc<MemoryStore>>;
pub type Comments =
    CachedSoftDeleteRepository<comment::Model, CountingSource<CommentSource>, Arc<MemoryStore>>;

/// Fresh in-memory database with migrations applied and fixtures inserted:
/// posts 1 "Model 1" (two comments) and 2 "Model 2"; comments 1 and 2 on
/// post 1, comment 3 "Model 3" trashed.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    for (id, text, comment_count) in [(1, "Model 1", 2), (2, "Model 2", 0)] {
        post::ActiveModel {
            id: Set(id),
            text: Set(text.to_string()),
            views: Set(0),
            comment_count: Set(comment_count),
            created_at: Set(Utc::now()),
        }
        .insert(&db)
        .await
        .expect("Failed to seed post");
    }

    for (id, post_id, text, trashed) in [
        (1, Some(1), "Model 1", false),
        (2, Some(1), "Model 2", false),
        (3, None, "Model 3", true),
    ] {
        comment::ActiveModel {
            id: Set(id),
            post_id: Set(post_id),
            text: Set(text.to_string()),
            created_at: Set(Utc::now()),
            deleted_at: Set(trashed.then(Utc::now)),
        }
        .insert(&db)
        .await
        .expect("Failed to seed comment");
    }

    db
}

/// Number of queries each lookup made against the wrapped source.
#[derive(Debug, Default)]
pub struct QueryCounts {
    by_key: AtomicUsize,
    by_field: AtomicUsize,
    many: AtomicUsize,
}

impl QueryCounts {
    pub fn by_key(&self) -> usize {
        self.by_key.load(Ordering::SeqCst)
    }

    pub fn by_field(&self) -> usize {
        self.by_field.load(Ordering::SeqCst)
    }

    pub fn many(&self) -> usize {
        self.many.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.by_key() + self.by_field() + self.many()
    }
}

pub struct CountingSource<D> {
    inner: D,
    counts: Arc<QueryCounts>,
}

impl<D> CountingSource<D> {
    pub fn new(inner: D) -> (Self, Arc<QueryCounts>) {
        let counts = Arc::new(QueryCounts::default());
        (
            Self {
                inner,
                counts: counts.clone(),
            },
            counts,
        )
    }
}

#[async_trait]
impl<E: Record, D: DataSource<E>> DataSource<E> for CountingSource<D> {
    async fn query_by_key(&self, id: &E::Key, scope: Scope) -> AppResult<Option<E>> {
        self.counts.by_key.fetch_add(1, Ordering::SeqCst);
        self.inner.query_by_key(id, scope).await
    }

    async fn query_by_field(
        &self,
        field: &str,
        value: &FieldValue,
        scope: Scope,
    ) -> AppResult<Option<E>> {
        self.counts.by_field.fetch_add(1, Ordering::SeqCst);
        self.inner.query_by_field(field, value, scope).await
    }

    async fn query_many_by_keys(&self, ids: &[E::Key], scope: Scope) -> AppResult<Vec<E>> {
        self.counts.many.fetch_add(1, Ordering::SeqCst);
        self.inner.query_many_by_keys(ids, scope).await
    }

    async fn query_all(&self, scope: Scope) -> AppResult<Vec<E>> {
        self.inner.query_all(scope).await
    }

    async fn insert(&self, entity: &E) -> AppResult<E> {
        self.inner.insert(entity).await
    }

    async fn update(&self, entity: &E, fields: &[String]) -> AppResult<E> {
        self.inner.update(entity, fields).await
    }

    async fn delete(&self, entity: &E) -> AppResult<bool> {
        self.inner.delete(entity).await
    }

    async fn force_delete(&self, entity: &E) -> AppResult<bool> {
        self.inner.force_delete(entity).await
    }

    async fn restore(&self, entity: &E) -> AppResult<bool> {
        self.inner.restore(entity).await
    }

    async fn increment(&self, id: &E::Key, field: &str, amount: i64) -> AppResult<u64> {
        self.inner.increment(id, field, amount).await
    }
}

pub fn post_base(
    db: &DatabaseConnection,
    options: RepositoryOptions,
) -> (BaseRepository<post::Model, CountingSource<PostSource>>, Arc<QueryCounts>) {
    let (source, counts) = CountingSource::new(PostSource::new(db.clone()));
    (BaseRepository::new(source).with_options(options), counts)
}

pub fn cached_posts(db: &DatabaseConnection) -> (Posts, Arc<MemoryStore>, Arc<QueryCounts>) {
    let store = Arc::new(MemoryStore::new());
    let (base, counts) = post_base(db, RepositoryOptions::default());
    let posts = CachedRepository::new(base, store.clone()).with_keys(PostCacheKeys);
    (posts, store, counts)
}

pub fn cached_comments(db: &DatabaseConnection) -> (Comments, Arc<MemoryStore>, Arc<QueryCounts>) {
    let store = Arc::new(MemoryStore::new());
    let (source, counts) =
        CountingSource::new(CommentSource::new(db.clone()).soft_deletes(comment::Column::DeletedAt));
    let comments = CachedSoftDeleteRepository::new(BaseRepository::new(source), store.clone());
    (comments, store, counts)
}

/// Decoded primary key entry, if any.
pub async fn cached_entry<E: Record>(store: &MemoryStore, key: &str) -> Option<Cached<E>> {
    let raw = store.get(key).await.expect("memory store never fails")?;
    Some(serde_json::from_str(&raw).expect("cache entry is valid JSON"))
}
