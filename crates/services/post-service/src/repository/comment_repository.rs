//! Cached comment repository with soft deletes.

use std::sync::Arc;

use async_trait::async_trait;
use cached_repository::{
    update_parent_count, BaseRepository, CacheStore, CachedSoftDeleteRepository, Repository,
    RepositoryListener, RepositoryOptions, SeaOrmSource,
};
use common::AppResult;
use domain::{DirtyAttributes, SoftDeletable, DELETED_AT_FIELD};
use sea_orm::DatabaseConnection;

use super::entities::{comment, post};

pub type CommentSource = SeaOrmSource<comment::Entity, comment::ActiveModel>;

pub type CommentRepository<S> = CachedSoftDeleteRepository<comment::Model, CommentSource, S>;

const COMMENT_COUNT_FIELD: &str = "comment_count";
const POST_ID_FIELD: &str = "post_id";

pub fn comment_repository<S: CacheStore>(
    db: DatabaseConnection,
    cache: S,
    options: RepositoryOptions,
    posts: Arc<dyn Repository<post::Model>>,
) -> CommentRepository<S> {
    let source = CommentSource::new(db).soft_deletes(comment::Column::DeletedAt);
    let base = BaseRepository::new(source)
        .with_options(options)
        .with_listener(Arc::new(CommentCounter::new(posts)));
    CachedSoftDeleteRepository::new(base, cache)
}

/// Keeps `posts.comment_count` in line with the comments that are not trashed.
pub struct CommentCounter {
    posts: Arc<dyn Repository<post::Model>>,
}

impl CommentCounter {
    pub fn new(posts: Arc<dyn Repository<post::Model>>) -> Self {
        Self { posts }
    }

    async fn move_count(&self, from: Option<i32>, to: Option<i32>) -> AppResult<()> {
        update_parent_count::<post::Model, _>(
            self.posts.as_ref(),
            COMMENT_COUNT_FIELD,
            from.as_ref(),
            to.as_ref(),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RepositoryListener<comment::Model> for CommentCounter {
    async fn on_insert(&self, comment: &comment::Model) -> AppResult<()> {
        if comment.trashed() {
            return Ok(());
        }
        self.move_count(None, comment.post_id).await
    }

    async fn on_update(&self, comment: &comment::Model, dirty: &DirtyAttributes) -> AppResult<()> {
        let was_trashed = match dirty.get(DELETED_AT_FIELD) {
            Some(previous) => !previous.is_null(),
            None => comment.trashed(),
        };
        let previous_post = match dirty.get(POST_ID_FIELD) {
            Some(previous) => previous.as_i64().and_then(|id| i32::try_from(id).ok()),
            None => comment.post_id,
        };

        // only live comments are counted
        let from = if was_trashed { None } else { previous_post };
        let to = if comment.trashed() { None } else { comment.post_id };
        self.move_count(from, to).await
    }

    async fn on_delete(&self, comment: &comment::Model) -> AppResult<()> {
        if comment.trashed() {
            return Ok(());
        }
        self.move_count(comment.post_id, None).await
    }
}
