//! Repository talking straight to its data source.

use std::sync::Arc;

use async_trait::async_trait;
use common::{AppError, AppResult};
use domain::{
    adjust_field, DirtyAttributes, FieldValue, Record, RecordKey, SoftDeletable, Tracked,
    MISSING_FIELD_MESSAGE,
};
use serde_json::Value;

use crate::listener::{Listeners, RepositoryListener};
use crate::not_found::RepositoryOptions;
use crate::source::{DataSource, Scope};
use crate::traits::{Repository, SoftDeleteRepository};

/// Repository without a cache.
///
/// Reads go to the data source with the [`Scope::Default`] scope, so a
/// soft-deleting source never returns trashed rows from the plain lookups.
pub struct BaseRepository<E: Record, D> {
    source: D,
    listeners: Listeners<E>,
    options: RepositoryOptions,
}

impl<E: Record, D: DataSource<E>> BaseRepository<E, D> {
    pub fn new(source: D) -> Self {
        Self {
            source,
            listeners: Listeners::default(),
            options: RepositoryOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RepositoryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn RepositoryListener<E>>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn source(&self) -> &D {
        &self.source
    }

    pub fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    pub(crate) async fn find_scoped(&self, id: &E::Key, scope: Scope) -> AppResult<Option<E>> {
        if id.is_empty() {
            return Ok(None);
        }
        self.source.query_by_key(id, scope).await
    }

    pub(crate) async fn find_one_by_scoped(
        &self,
        field: &str,
        value: &FieldValue,
        scope: Scope,
    ) -> AppResult<Option<E>> {
        ensure_field(field)?;
        if value.is_empty() {
            return Ok(None);
        }
        self.source.query_by_field(field, value, scope).await
    }

    pub(crate) async fn find_many_scoped(&self, ids: &[E::Key], scope: Scope) -> AppResult<Vec<E>> {
        let ids: Vec<E::Key> = ids.iter().filter(|id| !id.is_empty()).cloned().collect();
        self.source.query_many_by_keys(&ids, scope).await
    }
}

/// Reject field lookups without a field name.
pub(crate) fn ensure_field(field: &str) -> AppResult<()> {
    if field.is_empty() {
        return Err(AppError::invalid_argument(MISSING_FIELD_MESSAGE));
    }
    Ok(())
}

#[async_trait]
impl<E: Record, D: DataSource<E>> Repository<E> for BaseRepository<E, D> {
    async fn find(&self, id: &E::Key) -> AppResult<Option<E>> {
        self.find_scoped(id, Scope::Default).await
    }

    async fn find_many(&self, ids: &[E::Key]) -> AppResult<Vec<E>> {
        self.find_many_scoped(ids, Scope::Default).await
    }

    async fn find_one_by(&self, field: &str, value: &FieldValue) -> AppResult<Option<E>> {
        self.find_one_by_scoped(field, value, Scope::Default).await
    }

    async fn all(&self) -> AppResult<Vec<E>> {
        self.source.query_all(Scope::Default).await
    }

    async fn persist(&self, entity: &mut Tracked<E>) -> AppResult<bool> {
        let dirty = entity.dirty()?;
        let is_new = entity.is_new();

        let saved = if is_new {
            if !self.listeners.allow_create(entity.get()).await? {
                tracing::debug!(entity = E::NAME, "Insert vetoed by listener");
                return Ok(false);
            }
            self.source.insert(entity.get()).await?
        } else {
            let fields: Vec<String> = dirty.keys().cloned().collect();
            self.source.update(entity.get(), &fields).await?
        };

        entity.sync(saved);

        if is_new {
            self.listeners.inserted(entity.get(), &dirty).await?;
        } else {
            self.listeners.updated(entity.get(), &dirty).await?;
        }

        Ok(true)
    }

    async fn remove(&self, entity: &E) -> AppResult<bool> {
        if !self.source.delete(entity).await? {
            return Ok(false);
        }

        self.listeners.deleted(entity).await?;
        Ok(true)
    }

    async fn fresh(&self, entity: &E) -> AppResult<Option<E>> {
        self.find_scoped(&entity.key(), Scope::Default).await
    }

    async fn increment_or_decrement(
        &self,
        entity: &mut E,
        field: &str,
        amount: i64,
    ) -> AppResult<bool> {
        ensure_field(field)?;
        let id = entity.key();
        if id.is_empty() {
            return Ok(false);
        }

        let mut adjusted = entity.clone();
        let previous = adjust_field(&mut adjusted, field, amount)?;

        let affected = self.source.increment(&id, field, amount).await?;
        *entity = adjusted;

        let dirty = DirtyAttributes::from([(field.to_string(), previous)]);
        self.listeners.updated(entity, &dirty).await?;

        Ok(affected > 0)
    }

    fn not_found_error(&self, field: &str, value: String) -> AppError {
        self.options.not_found_error(E::NAME, field, value)
    }
}

#[async_trait]
impl<E: SoftDeletable, D: DataSource<E>> SoftDeleteRepository<E> for BaseRepository<E, D> {
    async fn find_with_trashed(&self, id: &E::Key) -> AppResult<Option<E>> {
        self.find_scoped(id, Scope::WithTrashed).await
    }

    async fn find_trashed(&self, id: &E::Key) -> AppResult<Option<E>> {
        self.find_scoped(id, Scope::OnlyTrashed).await
    }

    async fn find_one_by_with_trashed(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> AppResult<Option<E>> {
        self.find_one_by_scoped(field, value, Scope::WithTrashed).await
    }

    async fn find_trashed_one_by(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> AppResult<Option<E>> {
        self.find_one_by_scoped(field, value, Scope::OnlyTrashed).await
    }

    async fn restore(&self, entity: &mut E) -> AppResult<bool> {
        if !self.source.restore(entity).await? {
            return Ok(false);
        }

        let previous = entity
            .deleted_at()
            .map(serde_json::to_value)
            .transpose()?
            .unwrap_or(Value::Null);
        entity.set_deleted_at(None);

        let dirty = DirtyAttributes::from([(E::DELETED_AT.to_string(), previous)]);
        self.listeners.updated(entity, &dirty).await?;
        Ok(true)
    }

    async fn force_remove(&self, entity: &E) -> AppResult<bool> {
        if !self.source.force_delete(entity).await? {
            return Ok(false);
        }

        self.listeners.deleted(entity).await?;
        Ok(true)
    }
}
