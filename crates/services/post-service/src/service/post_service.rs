//! Post service - Handles post and comment use cases.

use std::sync::Arc;

use async_trait::async_trait;

use cached_repository::{CacheStore, Repository, SoftDeleteRepository};
use common::AppResult;
use domain::{FieldValue, Tracked, DEFAULT_KEY_FIELD};

use crate::repository::entities::{comment, post};

/// Post service trait for dependency injection.
#[async_trait]
pub trait PostService: Send + Sync {
    /// Get post by ID
    async fn get_post(&self, id: i32) -> AppResult<post::Model>;

    /// Get the first post whose `field` equals `value`
    async fn get_post_by(&self, field: &str, value: FieldValue) -> AppResult<post::Model>;

    async fn create_post(&self, text: String) -> AppResult<post::Model>;

    /// Atomically add `by` to a counter column of a post
    async fn bump_post(&self, id: i32, field: &str, by: i64) -> AppResult<post::Model>;

    async fn add_comment(&self, post_id: i32, text: String) -> AppResult<comment::Model>;

    /// Soft delete a comment
    async fn trash_comment(&self, id: i32) -> AppResult<comment::Model>;

    /// Restore a soft-deleted comment
    async fn restore_comment(&self, id: i32) -> AppResult<comment::Model>;

    /// Drop every cached entry
    async fn flush_cache(&self) -> AppResult<()>;
}

/// Concrete implementation of PostService using repositories.
pub struct PostManager {
    posts: Arc<dyn Repository<post::Model>>,
    comments: Arc<dyn SoftDeleteRepository<comment::Model>>,
    cache: Arc<dyn CacheStore>,
}

impl PostManager {
    /// Create new post service instance with repositories
    pub fn new(
        posts: Arc<dyn Repository<post::Model>>,
        comments: Arc<dyn SoftDeleteRepository<comment::Model>>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            posts,
            comments,
            cache,
        }
    }
}

#[async_trait]
impl PostService for PostManager {
    async fn get_post(&self, id: i32) -> AppResult<post::Model> {
        self.posts.find_or_fail(&id).await
    }

    async fn get_post_by(&self, field: &str, value: FieldValue) -> AppResult<post::Model> {
        self.posts.find_one_by_or_fail(field, &value).await
    }

    async fn create_post(&self, text: String) -> AppResult<post::Model> {
        let mut post = Tracked::new(post::Model::new(text));
        self.posts.persist(&mut post).await?;
        Ok(post.into_inner())
    }

    async fn bump_post(&self, id: i32, field: &str, by: i64) -> AppResult<post::Model> {
        let mut post = self.posts.find_or_fail(&id).await?;
        match self.posts.increment(&mut post, field, by).await? {
            Some(post) => Ok(post),
            None => Err(self.posts.not_found_error(DEFAULT_KEY_FIELD, id.to_string())),
        }
    }

    async fn add_comment(&self, post_id: i32, text: String) -> AppResult<comment::Model> {
        let post = self.posts.find_or_fail(&post_id).await?;
        let mut comment = Tracked::new(comment::Model::new(Some(post.id), text));
        self.comments.persist(&mut comment).await?;
        Ok(comment.into_inner())
    }

    async fn trash_comment(&self, id: i32) -> AppResult<comment::Model> {
        let comment = self.comments.find_or_fail(&id).await?;
        self.comments.remove(&comment).await?;
        self.comments.find_with_trashed_or_fail(&id).await
    }

    async fn restore_comment(&self, id: i32) -> AppResult<comment::Model> {
        let mut comment = self.comments.find_trashed_or_fail(&id).await?;
        self.comments.restore(&mut comment).await?;
        Ok(comment)
    }

    async fn flush_cache(&self) -> AppResult<()> {
        self.cache.flush().await
    }
}
