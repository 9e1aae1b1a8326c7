//! Repository layer for data access.

mod comment_repository;
pub mod entities;
mod post_repository;

pub use comment_repository::{comment_repository, CommentCounter, CommentRepository, CommentSource};
pub use post_repository::{post_repository, PostCacheKeys, PostRepository, PostSource};
