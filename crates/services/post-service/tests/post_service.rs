//! Post service use cases over the wired repositories.

mod support;

use std::sync::Arc;

use cached_repository::{CacheStore, MemoryStore, Repository, SoftDeleteRepository};
use chrono::Utc;
use common::{AppError, RepositoryConfig};
use domain::{FieldValue, Tracked};
use post_service_lib::config::PostServiceConfig;
use post_service_lib::repository::entities::{comment, post};
use post_service_lib::repository::{comment_repository, post_repository, CommentRepository};
use post_service_lib::service::{PostManager, PostService};
use post_service_lib::wire;
use sea_orm::{DatabaseConnection, EntityTrait};

use support::setup_db;

fn service(db: &DatabaseConnection) -> (PostManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let service = wire(db.clone(), store.clone(), &PostServiceConfig::default());
    (service, store)
}

async fn stored_comment_count(db: &DatabaseConnection, id: i32) -> i64 {
    post::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .comment_count
}

#[tokio::test]
async fn test_get_post_and_not_found() {
    let db = setup_db().await;
    let (service, store) = service(&db);

    assert_eq!(service.get_post(1).await.unwrap().text, "Model 1");
    assert!(store.get("post:1").await.unwrap().is_some());

    let err = service.get_post(500).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "The post you were looking for could not be found.");
}

#[tokio::test]
async fn test_get_post_by_field() {
    let db = setup_db().await;
    let (service, _store) = service(&db);

    let post = service
        .get_post_by("text", FieldValue::from("Model 2"))
        .await
        .unwrap();
    assert_eq!(post.id, 2);

    let err = service
        .get_post_by("text", FieldValue::from("Model 9"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { ref field, .. } if field == "text"));
}

#[tokio::test]
async fn test_create_post() {
    let db = setup_db().await;
    let (service, _store) = service(&db);

    let created = service.create_post("Hello".to_string()).await.unwrap();
    assert!(created.id > 2);
    assert_eq!(service.get_post(created.id).await.unwrap(), created);
}

#[tokio::test]
async fn test_add_comment_counts_on_post() {
    let db = setup_db().await;
    let (service, _store) = service(&db);

    let comment = service.add_comment(2, "First".to_string()).await.unwrap();
    assert_eq!(comment.post_id, Some(2));
    assert!(comment.id > 3);

    assert_eq!(stored_comment_count(&db, 2).await, 1);
    assert_eq!(service.get_post(2).await.unwrap().comment_count, 1);

    assert!(service
        .add_comment(500, "Orphan".to_string())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_trash_and_restore_keep_count() {
    let db = setup_db().await;
    let (service, _store) = service(&db);

    let trashed = service.trash_comment(1).await.unwrap();
    assert!(trashed.deleted_at.is_some());
    assert_eq!(service.get_post(1).await.unwrap().comment_count, 1);

    // already trashed
    assert!(service.trash_comment(1).await.unwrap_err().is_not_found());

    let restored = service.restore_comment(1).await.unwrap();
    assert!(restored.deleted_at.is_none());
    assert_eq!(service.get_post(1).await.unwrap().comment_count, 2);
    assert_eq!(stored_comment_count(&db, 1).await, 2);

    assert!(service.restore_comment(2).await.unwrap_err().is_not_found());
}

fn repositories(
    db: &DatabaseConnection,
) -> (Arc<dyn Repository<post::Model>>, CommentRepository<Arc<MemoryStore>>) {
    let store = Arc::new(MemoryStore::new());
    let posts: Arc<dyn Repository<post::Model>> =
        Arc::new(post_repository(db.clone(), store.clone(), Default::default()));
    let comments = comment_repository(db.clone(), store, Default::default(), posts.clone());
    (posts, comments)
}

#[tokio::test]
async fn test_moving_comment_between_posts() {
    let db = setup_db().await;
    let (posts, comments) = repositories(&db);

    let mut comment = Tracked::loaded(comments.find(&2).await.unwrap().unwrap());
    comment.post_id = Some(2);
    assert!(comments.persist(&mut comment).await.unwrap());

    assert_eq!(posts.find(&1).await.unwrap().unwrap().comment_count, 1);
    assert_eq!(posts.find(&2).await.unwrap().unwrap().comment_count, 1);
    assert_eq!(stored_comment_count(&db, 1).await, 1);
    assert_eq!(stored_comment_count(&db, 2).await, 1);

    // editing the text alone leaves the counts alone
    comment.text = "Edited".to_string();
    assert!(comments.persist(&mut comment).await.unwrap());
    assert_eq!(stored_comment_count(&db, 2).await, 1);

    let stored = comment::Entity::find_by_id(2).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.text, "Edited");
    assert_eq!(stored.post_id, Some(2));
}

#[tokio::test]
async fn test_removing_trashed_comment_twice() {
    let db = setup_db().await;
    let (_posts, comments) = repositories(&db);

    let comment = comments.find(&1).await.unwrap().unwrap();
    assert!(comments.remove(&comment).await.unwrap());
    let deleted_at = comments.find_trashed(&1).await.unwrap().unwrap().deleted_at;

    // the caller's copy still looks live
    assert!(!comments.remove(&comment).await.unwrap());

    assert_eq!(stored_comment_count(&db, 1).await, 1);
    let stored = comment::Entity::find_by_id(1).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.deleted_at, deleted_at);
}

#[tokio::test]
async fn test_trash_and_restore_through_persist() {
    let db = setup_db().await;
    let (posts, comments) = repositories(&db);

    let mut comment = Tracked::loaded(comments.find(&1).await.unwrap().unwrap());
    comment.deleted_at = Some(Utc::now());
    assert!(comments.persist(&mut comment).await.unwrap());

    assert!(comments.find(&1).await.unwrap().is_none());
    assert_eq!(stored_comment_count(&db, 1).await, 1);
    assert_eq!(posts.find(&1).await.unwrap().unwrap().comment_count, 1);

    comment.deleted_at = None;
    assert!(comments.persist(&mut comment).await.unwrap());

    assert!(comments.find(&1).await.unwrap().is_some());
    assert_eq!(stored_comment_count(&db, 1).await, 2);
}

#[tokio::test]
async fn test_trashing_and_moving_in_one_write() {
    let db = setup_db().await;
    let (_posts, comments) = repositories(&db);

    let mut comment = Tracked::loaded(comments.find(&2).await.unwrap().unwrap());
    comment.post_id = Some(2);
    comment.deleted_at = Some(Utc::now());
    assert!(comments.persist(&mut comment).await.unwrap());

    assert_eq!(stored_comment_count(&db, 1).await, 1);
    assert_eq!(stored_comment_count(&db, 2).await, 0);
}

#[tokio::test]
async fn test_bump_post() {
    let db = setup_db().await;
    let (service, _store) = service(&db);

    assert_eq!(service.bump_post(1, "views", 2).await.unwrap().views, 2);
    assert_eq!(service.bump_post(1, "views", -1).await.unwrap().views, 1);
    assert_eq!(service.get_post(1).await.unwrap().views, 1);

    assert!(matches!(
        service.bump_post(1, "text", 1).await.unwrap_err(),
        AppError::InvalidArgument(_)
    ));
    assert!(service.bump_post(500, "views", 1).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_flush_cache() {
    let db = setup_db().await;
    let (service, store) = service(&db);

    service.get_post(1).await.unwrap();
    service.get_post(500).await.unwrap_err();
    assert_eq!(store.len().await, 2);

    service.flush_cache().await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_wiring_with_local_memo() {
    let db = setup_db().await;
    let store = Arc::new(MemoryStore::new());
    let config = PostServiceConfig {
        repository: RepositoryConfig {
            use_local_memo: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let service = wire(db.clone(), store.clone(), &config);

    assert_eq!(service.get_post(2).await.unwrap().text, "Model 2");
    assert!(store.get("post:2").await.unwrap().is_some());

    service.add_comment(2, "Memoized".to_string()).await.unwrap();
    assert_eq!(service.get_post(2).await.unwrap().comment_count, 1);
}
