//! Lifecycle hooks fired by repositories after writes.

use std::sync::Arc;

use async_trait::async_trait;
use common::AppResult;
use domain::{DirtyAttributes, Record};

/// Observer of a repository's writes.
///
/// Hooks run after the data source accepted the write. `dirty` maps each
/// changed attribute to its value before the write.
#[async_trait]
pub trait RepositoryListener<E: Record>: Send + Sync {
    /// Called before a new record is inserted. Returning `false` vetoes the insert.
    async fn creating(&self, _entity: &E) -> AppResult<bool> {
        Ok(true)
    }

    async fn on_insert(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    async fn on_update(&self, _entity: &E, _dirty: &DirtyAttributes) -> AppResult<()> {
        Ok(())
    }

    async fn on_delete(&self, _entity: &E) -> AppResult<()> {
        Ok(())
    }

    /// Called after every insert, update and delete.
    async fn on_change(&self, _entity: &E, _dirty: &DirtyAttributes) -> AppResult<()> {
        Ok(())
    }
}

/// Listeners of one repository, notified in registration order.
pub(crate) struct Listeners<E: Record> {
    listeners: Vec<Arc<dyn RepositoryListener<E>>>,
}

impl<E: Record> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<E: Record> Listeners<E> {
    pub(crate) fn push(&mut self, listener: Arc<dyn RepositoryListener<E>>) {
        self.listeners.push(listener);
    }

    pub(crate) async fn allow_create(&self, entity: &E) -> AppResult<bool> {
        for listener in &self.listeners {
            if !listener.creating(entity).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) async fn inserted(&self, entity: &E, dirty: &DirtyAttributes) -> AppResult<()> {
        for listener in &self.listeners {
            listener.on_insert(entity).await?;
        }
        self.changed(entity, dirty).await
    }

    pub(crate) async fn updated(&self, entity: &E, dirty: &DirtyAttributes) -> AppResult<()> {
        for listener in &self.listeners {
            listener.on_update(entity, dirty).await?;
        }
        self.changed(entity, dirty).await
    }

    pub(crate) async fn deleted(&self, entity: &E) -> AppResult<()> {
        for listener in &self.listeners {
            listener.on_delete(entity).await?;
        }
        self.changed(entity, &DirtyAttributes::new()).await
    }

    async fn changed(&self, entity: &E, dirty: &DirtyAttributes) -> AppResult<()> {
        for listener in &self.listeners {
            listener.on_change(entity, dirty).await?;
        }
        Ok(())
    }
}
