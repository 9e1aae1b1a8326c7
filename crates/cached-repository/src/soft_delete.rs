//! Cached repository over soft-deletable records.

use async_trait::async_trait;
use common::{AppError, AppResult};
use domain::{FieldValue, SoftDeletable, Tracked};

use crate::base::BaseRepository;
use crate::cache::CacheStore;
use crate::cached::{CacheKeys, CachedRepository};
use crate::source::{DataSource, Scope};
use crate::traits::{Repository, SoftDeleteRepository};

/// Caches the canonical row of every record, trashed or not, and applies
/// visibility when answering. A record's cache entry therefore never depends
/// on which lookup filled it.
pub struct CachedSoftDeleteRepository<E: SoftDeletable, D, S> {
    inner: CachedRepository<E, D, S>,
}

fn visible<E: SoftDeletable>(entity: Option<E>) -> Option<E> {
    entity.filter(|entity| !entity.trashed())
}

fn trashed<E: SoftDeletable>(entity: Option<E>) -> Option<E> {
    entity.filter(|entity| entity.trashed())
}

impl<E, D, S> CachedSoftDeleteRepository<E, D, S>
where
    E: SoftDeletable,
    D: DataSource<E>,
    S: CacheStore,
{
    pub fn new(base: BaseRepository<E, D>, cache: S) -> Self {
        Self {
            inner: CachedRepository::new(base, cache).with_lookup_scope(Scope::WithTrashed),
        }
    }

    pub fn with_keys(self, keys: impl CacheKeys<E> + 'static) -> Self {
        Self {
            inner: self.inner.with_keys(keys),
        }
    }

    /// The underlying cache, for `refresh`, `remember` and `forget`.
    pub fn cached(&self) -> &CachedRepository<E, D, S> {
        &self.inner
    }
}

#[async_trait]
impl<E, D, S> Repository<E> for CachedSoftDeleteRepository<E, D, S>
where
    E: SoftDeletable,
    D: DataSource<E>,
    S: CacheStore,
{
    async fn find(&self, id: &E::Key) -> AppResult<Option<E>> {
        Ok(visible(self.inner.find_by_key(id).await?))
    }

    async fn find_many(&self, ids: &[E::Key]) -> AppResult<Vec<E>> {
        let entities = self.inner.find_by_keys(ids).await?;
        Ok(entities.into_iter().filter(|entity| !entity.trashed()).collect())
    }

    async fn find_one_by(&self, field: &str, value: &FieldValue) -> AppResult<Option<E>> {
        Ok(visible(self.inner.find_by_field(field, value).await?))
    }

    async fn all(&self) -> AppResult<Vec<E>> {
        self.inner.all().await
    }

    async fn persist(&self, entity: &mut Tracked<E>) -> AppResult<bool> {
        self.inner.persist(entity).await
    }

    async fn remove(&self, entity: &E) -> AppResult<bool> {
        self.inner.remove(entity).await
    }

    async fn fresh(&self, entity: &E) -> AppResult<Option<E>> {
        Ok(visible(self.inner.fresh(entity).await?))
    }

    async fn increment_or_decrement(
        &self,
        entity: &mut E,
        field: &str,
        amount: i64,
    ) -> AppResult<bool> {
        self.inner.increment_or_decrement(entity, field, amount).await
    }

    fn not_found_error(&self, field: &str, value: String) -> AppError {
        self.inner.not_found_error(field, value)
    }
}

#[async_trait]
impl<E, D, S> SoftDeleteRepository<E> for CachedSoftDeleteRepository<E, D, S>
where
    E: SoftDeletable,
    D: DataSource<E>,
    S: CacheStore,
{
    async fn find_with_trashed(&self, id: &E::Key) -> AppResult<Option<E>> {
        self.inner.find_by_key(id).await
    }

    async fn find_trashed(&self, id: &E::Key) -> AppResult<Option<E>> {
        Ok(trashed(self.inner.find_by_key(id).await?))
    }

    async fn find_one_by_with_trashed(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> AppResult<Option<E>> {
        self.inner.find_by_field(field, value).await
    }

    async fn find_trashed_one_by(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> AppResult<Option<E>> {
        Ok(trashed(self.inner.find_by_field(field, value).await?))
    }

    async fn restore(&self, entity: &mut E) -> AppResult<bool> {
        let restored = self.inner.base().restore(entity).await?;
        self.inner.refresh(&entity.key()).await?;
        Ok(restored)
    }

    async fn force_remove(&self, entity: &E) -> AppResult<bool> {
        let removed = self.inner.base().force_remove(entity).await?;
        if removed {
            self.inner.forget_removed(entity).await?;
        }
        Ok(removed)
    }
}
