//! Cache failure policies: fall through to the database or propagate.

mod support;

use std::sync::Arc;

use cached_repository::{
    CacheStore, CachedRepository, MemoryStore, MockCacheStore, Repository, RepositoryOptions,
};
use common::{AppError, CacheFailurePolicy, RepositoryConfig};
use domain::Cached;
use post_service_lib::repository::entities::post;
use post_service_lib::repository::PostCacheKeys;

use support::{cached_entry, post_base, setup_db};

fn options(policy: CacheFailurePolicy) -> RepositoryOptions {
    RepositoryOptions::new(RepositoryConfig {
        cache_failures: policy,
        ..Default::default()
    })
}

fn unavailable() -> AppError {
    AppError::internal("cache unavailable")
}

#[tokio::test]
async fn test_fall_through_reads_database() {
    let db = setup_db().await;
    let (base, counts) = post_base(&db, options(CacheFailurePolicy::FallThrough));

    let mut cache = MockCacheStore::new();
    cache.expect_get().times(2).returning(|_| Err(unavailable()));
    cache
        .expect_set_forever()
        .times(2)
        .returning(|_, _| Err(unavailable()));
    let posts = CachedRepository::new(base, cache);

    assert_eq!(posts.find(&1).await.unwrap().unwrap().text, "Model 1");
    assert!(posts.find(&500).await.unwrap().is_none());
    assert_eq!(counts.by_key(), 2);
}

#[tokio::test]
async fn test_propagate_read_failure() {
    let db = setup_db().await;
    let (base, counts) = post_base(&db, options(CacheFailurePolicy::Propagate));

    let mut cache = MockCacheStore::new();
    cache.expect_get().times(1).returning(|_| Err(unavailable()));
    cache.expect_set_forever().never();
    let posts = CachedRepository::new(base, cache);

    let err = posts.find(&1).await.unwrap_err();
    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(counts.by_key(), 0);
}

#[tokio::test]
async fn test_propagate_write_failure() {
    let db = setup_db().await;
    let (base, counts) = post_base(&db, options(CacheFailurePolicy::Propagate));

    let mut cache = MockCacheStore::new();
    cache.expect_get().times(1).returning(|_| Ok(None));
    cache
        .expect_set_forever()
        .withf(|key, _| key.to_string() == "post:1")
        .times(1)
        .returning(|_, _| Err(unavailable()));
    let posts = CachedRepository::new(base, cache);

    assert!(posts.find(&1).await.is_err());
    assert_eq!(counts.by_key(), 1);
}

#[tokio::test]
async fn test_fall_through_batch_lookup() {
    let db = setup_db().await;
    let (base, counts) = post_base(&db, options(CacheFailurePolicy::FallThrough));

    let mut cache = MockCacheStore::new();
    cache
        .expect_get_many()
        .times(1)
        .returning(|_| Err(unavailable()));
    cache.expect_set_forever().times(3).returning(|_, _| Ok(()));
    let posts = CachedRepository::new(base, cache);

    let mut found = posts.find_many(&[2, 1, 500]).await.unwrap();
    found.sort_by_key(|post| post.id);
    assert_eq!(found.iter().map(|post| post.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(counts.many(), 1);
}

#[tokio::test]
async fn test_fall_through_forget_still_removes_row() {
    let db = setup_db().await;
    let (base, _counts) = post_base(&db, options(CacheFailurePolicy::FallThrough));

    let mut cache = MockCacheStore::new();
    cache.expect_get().returning(|_| Ok(None));
    cache.expect_set_forever().returning(|_, _| Ok(()));
    // field key, then primary key
    cache.expect_forget().times(2).returning(|_| Err(unavailable()));
    let posts = CachedRepository::new(base, cache).with_keys(PostCacheKeys);

    let post = posts.find(&2).await.unwrap().unwrap();
    assert!(posts.remove(&post).await.unwrap());
    assert!(posts.base().find(&2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_propagate_forget_failure_after_delete() {
    let db = setup_db().await;
    let (base, _counts) = post_base(&db, options(CacheFailurePolicy::Propagate));

    let mut cache = MockCacheStore::new();
    cache.expect_forget().times(1).returning(|_| Err(unavailable()));
    let posts = CachedRepository::new(base, cache);

    let post = posts.base().find(&2).await.unwrap().unwrap();
    assert!(posts.remove(&post).await.is_err());
    // the row is gone even though the cache could not be told
    assert!(posts.base().find(&2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_entry_falls_through_and_is_replaced() {
    let db = setup_db().await;
    let (base, counts) = post_base(&db, options(CacheFailurePolicy::FallThrough));
    let store = Arc::new(MemoryStore::new());
    store
        .set_forever("post:1", "{not json".to_string())
        .await
        .unwrap();
    let posts = CachedRepository::new(base, store.clone());

    let found = posts.find(&1).await.unwrap().unwrap();
    assert_eq!(found.text, "Model 1");
    assert_eq!(counts.by_key(), 1);
    assert_eq!(
        cached_entry::<post::Model>(&store, "post:1").await,
        Some(Cached::Found(found))
    );
}

#[tokio::test]
async fn test_corrupt_entry_propagates() {
    let db = setup_db().await;
    let (base, counts) = post_base(&db, options(CacheFailurePolicy::Propagate));
    let store = Arc::new(MemoryStore::new());
    store
        .set_forever("post:1", "{not json".to_string())
        .await
        .unwrap();
    let posts = CachedRepository::new(base, store);

    let err = posts.find(&1).await.unwrap_err();
    assert!(matches!(err, AppError::Serialization(_)));
    assert_eq!(counts.by_key(), 0);
}
