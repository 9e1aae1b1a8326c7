//! Post Service Library
//!
//! Posts and soft-deletable comments served through cached repositories.
//! Used by the `post-service` CLI and by the integration tests.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use cached_repository::{CacheStore, LocalMemo, RepositoryOptions};
use common::AppResult;

use crate::config::PostServiceConfig;
use crate::infra::{connect_cache, Database};
use crate::repository::{comment_repository, post_repository};
use crate::service::PostManager;

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = PostServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Connect to the database and cache and wire the repositories.
pub async fn build_service(config: &PostServiceConfig) -> AppResult<PostManager> {
    let db = Database::connect(&config.database).await?;
    let cache = connect_cache(&config.cache).await?;
    Ok(wire(db.get_connection(), cache, config))
}

/// Wire repositories over an open connection and cache store.
pub fn wire(
    db: sea_orm::DatabaseConnection,
    cache: Arc<dyn CacheStore>,
    config: &PostServiceConfig,
) -> PostManager {
    let cache: Arc<dyn CacheStore> = if config.repository.use_local_memo {
        Arc::new(LocalMemo::new(cache))
    } else {
        cache
    };
    let options = RepositoryOptions::new(config.repository.clone());

    let posts = Arc::new(post_repository(db.clone(), cache.clone(), options.clone()));
    let comments = Arc::new(comment_repository(db, cache.clone(), options, posts.clone()));

    PostManager::new(posts, comments, cache)
}
