//! Read-through, write-invalidate cache in front of a [`BaseRepository`].
//!
//! Primary key entries hold [`Cached::Found`] or [`Cached::Missing`], so
//! absent records are remembered too. Field entries hold the primary key of
//! the matching record and are only written for hits.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{AppError, AppResult, CacheFailurePolicy};
use domain::{
    field_cache_key, primary_key_cache_key, Cached, FieldValue, Record, RecordKey, Tracked,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::base::{ensure_field, BaseRepository};
use crate::cache::CacheStore;
use crate::source::{DataSource, Scope};
use crate::traits::Repository;

/// Cache key layout of one record type.
pub trait CacheKeys<E: Record>: Send + Sync {
    fn primary(&self, id: &E::Key) -> String {
        primary_key_cache_key(E::NAME, id)
    }

    /// Key remembering which record has `value` in `field`.
    /// `None` disables field caching for that field.
    fn field(&self, field: &str, value: &FieldValue) -> Option<String> {
        Some(field_cache_key(E::NAME, field, value))
    }

    /// Field keys to drop when `entity` is removed.
    fn field_keys_to_forget(&self, _entity: &E) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCacheKeys;

impl<E: Record> CacheKeys<E> for DefaultCacheKeys {}

/// Repository answering key and field lookups from a cache store first.
pub struct CachedRepository<E: Record, D, S> {
    base: BaseRepository<E, D>,
    cache: S,
    keys: Arc<dyn CacheKeys<E>>,
    lookup_scope: Scope,
}

impl<E, D, S> CachedRepository<E, D, S>
where
    E: Record,
    D: DataSource<E>,
    S: CacheStore,
{
    pub fn new(base: BaseRepository<E, D>, cache: S) -> Self {
        Self {
            base,
            cache,
            keys: Arc::new(DefaultCacheKeys),
            lookup_scope: Scope::Default,
        }
    }

    pub fn with_keys(mut self, keys: impl CacheKeys<E> + 'static) -> Self {
        self.keys = Arc::new(keys);
        self
    }

    /// Scope used when filling the cache from the data source.
    pub(crate) fn with_lookup_scope(mut self, scope: Scope) -> Self {
        self.lookup_scope = scope;
        self
    }

    pub fn base(&self) -> &BaseRepository<E, D> {
        &self.base
    }

    pub fn cache(&self) -> &S {
        &self.cache
    }

    pub fn primary_cache_key(&self, id: &E::Key) -> String {
        self.keys.primary(id)
    }

    pub fn field_cache_key(&self, field: &str, value: &FieldValue) -> Option<String> {
        self.keys.field(field, value)
    }

    /// Reload a record from the data source, bypassing the cache read, and
    /// cache the outcome.
    pub async fn refresh(&self, id: &E::Key) -> AppResult<Option<E>> {
        if id.is_empty() {
            return Ok(None);
        }

        let entity = self.base.source().query_by_key(id, self.lookup_scope).await?;
        self.store(&self.keys.primary(id), entity.as_ref()).await?;
        Ok(entity)
    }

    pub async fn remember(&self, entity: &E) -> AppResult<()> {
        self.store(&self.keys.primary(&entity.key()), Some(entity))
            .await
    }

    pub async fn forget(&self, id: &E::Key) -> AppResult<bool> {
        self.forget_key(&self.keys.primary(id)).await
    }

    pub async fn forget_entity(&self, entity: &E) -> AppResult<bool> {
        self.forget(&entity.key()).await
    }

    /// Drop the field keys and the primary key entry of a removed record.
    pub(crate) async fn forget_removed(&self, entity: &E) -> AppResult<()> {
        for key in self.keys.field_keys_to_forget(entity) {
            self.forget_key(&key).await?;
        }
        self.forget_entity(entity).await?;
        Ok(())
    }

    pub(crate) async fn find_by_key(&self, id: &E::Key) -> AppResult<Option<E>> {
        if id.is_empty() {
            return Ok(None);
        }

        let key = self.keys.primary(id);
        match self.read::<Cached<E>>(&key).await? {
            Some(Cached::Found(entity)) => {
                tracing::debug!(key = %key, "Cache hit");
                return Ok(Some(entity));
            }
            Some(Cached::Missing) => {
                tracing::debug!(key = %key, "Cache hit (missing)");
                return Ok(None);
            }
            None => tracing::debug!(key = %key, "Cache miss"),
        }

        let entity = self.base.source().query_by_key(id, self.lookup_scope).await?;
        self.store(&key, entity.as_ref()).await?;
        Ok(entity)
    }

    pub(crate) async fn find_by_field(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> AppResult<Option<E>> {
        ensure_field(field)?;
        if value.is_empty() {
            return Ok(None);
        }

        let field_key = self.keys.field(field, value);
        if let Some(key) = &field_key {
            if let Some(id) = self.read::<E::Key>(key).await? {
                tracing::debug!(key = %key, id = %id, "Field cache hit");
                return self.find_by_key(&id).await;
            }
        }

        let Some(entity) = self
            .base
            .source()
            .query_by_field(field, value, self.lookup_scope)
            .await?
        else {
            return Ok(None);
        };

        self.remember(&entity).await?;
        if let Some(key) = &field_key {
            self.write(key, &entity.key()).await?;
        }
        Ok(Some(entity))
    }

    pub(crate) async fn find_by_keys(&self, ids: &[E::Key]) -> AppResult<Vec<E>> {
        let mut seen = HashSet::new();
        let wanted: Vec<(String, E::Key)> = ids
            .iter()
            .filter(|id| !id.is_empty() && seen.insert((*id).clone()))
            .map(|id| (self.keys.primary(id), id.clone()))
            .collect();

        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = wanted.iter().map(|(key, _)| key.clone()).collect();
        let cached = self.read_many::<Cached<E>>(&keys).await?;

        let mut found = Vec::with_capacity(wanted.len());
        let mut unknown = Vec::new();
        for ((key, id), entry) in wanted.into_iter().zip(cached) {
            match entry {
                Some(Cached::Found(entity)) => found.push(entity),
                Some(Cached::Missing) => {}
                None => unknown.push((key, id)),
            }
        }

        if unknown.is_empty() {
            return Ok(found);
        }

        let unknown_ids: Vec<E::Key> = unknown.iter().map(|(_, id)| id.clone()).collect();
        let mut loaded: HashMap<E::Key, E> = self
            .base
            .source()
            .query_many_by_keys(&unknown_ids, self.lookup_scope)
            .await?
            .into_iter()
            .map(|entity| (entity.key(), entity))
            .collect();

        for (key, id) in unknown {
            let entity = loaded.remove(&id);
            self.store(&key, entity.as_ref()).await?;
            found.extend(entity);
        }

        Ok(found)
    }

    async fn store(&self, key: &str, entity: Option<&E>) -> AppResult<()> {
        self.write(key, &Cached::from(entity)).await
    }

    // =========================================================================
    // Store access under the cache failure policy
    // =========================================================================

    fn tolerate(&self, key: &str, err: AppError) -> AppResult<()> {
        match self.base.options().config.cache_failures {
            CacheFailurePolicy::FallThrough => {
                tracing::warn!(key = %key, error = %err, "Cache unavailable, falling through");
                Ok(())
            }
            CacheFailurePolicy::Propagate => Err(err),
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let raw = match self.cache.get(key).await {
            Ok(raw) => raw,
            Err(err) => return self.tolerate(key, err).map(|_| None),
        };
        self.decode(key, raw)
    }

    async fn read_many<T: DeserializeOwned>(&self, keys: &[String]) -> AppResult<Vec<Option<T>>> {
        let raw = match self.cache.get_many(keys).await {
            Ok(raw) => raw,
            Err(err) => {
                self.tolerate(&keys.join(","), err)?;
                vec![None; keys.len()]
            }
        };

        keys.iter()
            .zip(raw)
            .map(|(key, value)| self.decode(key, value))
            .collect()
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, raw: Option<String>) -> AppResult<Option<T>> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => self.tolerate(key, err.into()).map(|_| None),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        let raw = serde_json::to_string(value)?;
        if let Err(err) = self.cache.set_forever(key, raw).await {
            self.tolerate(key, err)?;
        }
        Ok(())
    }

    async fn forget_key(&self, key: &str) -> AppResult<bool> {
        match self.cache.forget(key).await {
            Ok(removed) => Ok(removed),
            Err(err) => self.tolerate(key, err).map(|_| false),
        }
    }
}

#[async_trait]
impl<E, D, S> Repository<E> for CachedRepository<E, D, S>
where
    E: Record,
    D: DataSource<E>,
    S: CacheStore,
{
    async fn find(&self, id: &E::Key) -> AppResult<Option<E>> {
        self.find_by_key(id).await
    }

    async fn find_many(&self, ids: &[E::Key]) -> AppResult<Vec<E>> {
        self.find_by_keys(ids).await
    }

    async fn find_one_by(&self, field: &str, value: &FieldValue) -> AppResult<Option<E>> {
        self.find_by_field(field, value).await
    }

    async fn all(&self) -> AppResult<Vec<E>> {
        self.base.all().await
    }

    async fn persist(&self, entity: &mut Tracked<E>) -> AppResult<bool> {
        if !self.base.persist(entity).await? {
            return Ok(false);
        }

        self.refresh(&entity.key()).await?;
        Ok(true)
    }

    async fn remove(&self, entity: &E) -> AppResult<bool> {
        let removed = self.base.remove(entity).await?;
        if removed {
            self.forget_removed(entity).await?;
        }
        Ok(removed)
    }

    async fn fresh(&self, entity: &E) -> AppResult<Option<E>> {
        self.refresh(&entity.key()).await
    }

    async fn increment_or_decrement(
        &self,
        entity: &mut E,
        field: &str,
        amount: i64,
    ) -> AppResult<bool> {
        let adjusted = self.base.increment_or_decrement(entity, field, amount).await?;
        self.refresh(&entity.key()).await?;
        Ok(adjusted)
    }

    fn not_found_error(&self, field: &str, value: String) -> AppError {
        self.base.not_found_error(field, value)
    }
}
