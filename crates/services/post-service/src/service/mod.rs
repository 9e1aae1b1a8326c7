//! Service layer - business logic.

mod post_service;

pub use post_service::{PostManager, PostService};
