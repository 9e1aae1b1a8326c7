//! Data sources behind the repositories.

mod sea_orm_source;

use std::sync::Arc;

use async_trait::async_trait;
use common::AppResult;
use domain::{FieldValue, Record};

pub use sea_orm_source::SeaOrmSource;

/// Which rows of a soft-deleting source a query sees.
///
/// Sources without a deletion column ignore the scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// Rows that are not trashed
    #[default]
    Default,
    WithTrashed,
    OnlyTrashed,
}

/// Authoritative store for one record type.
#[async_trait]
pub trait DataSource<E: Record>: Send + Sync {
    async fn query_by_key(&self, id: &E::Key, scope: Scope) -> AppResult<Option<E>>;

    /// First row, by primary key order, whose `field` equals `value`.
    async fn query_by_field(
        &self,
        field: &str,
        value: &FieldValue,
        scope: Scope,
    ) -> AppResult<Option<E>>;

    async fn query_many_by_keys(&self, ids: &[E::Key], scope: Scope) -> AppResult<Vec<E>>;

    async fn query_all(&self, scope: Scope) -> AppResult<Vec<E>>;

    /// Insert a new row, returning it as stored (generated key included).
    async fn insert(&self, entity: &E) -> AppResult<E>;

    /// Write the named attributes of an existing row.
    async fn update(&self, entity: &E, fields: &[String]) -> AppResult<E>;

    /// Soft delete when the source supports it, hard delete otherwise.
    async fn delete(&self, entity: &E) -> AppResult<bool>;

    async fn force_delete(&self, entity: &E) -> AppResult<bool>;

    async fn restore(&self, entity: &E) -> AppResult<bool>;

    /// Atomically add `amount` to an integer column, returning affected rows.
    async fn increment(&self, id: &E::Key, field: &str, amount: i64) -> AppResult<u64>;
}

#[async_trait]
impl<E: Record, D: DataSource<E> + ?Sized> DataSource<E> for Arc<D> {
    async fn query_by_key(&self, id: &E::Key, scope: Scope) -> AppResult<Option<E>> {
        (**self).query_by_key(id, scope).await
    }

    async fn query_by_field(
        &self,
        field: &str,
        value: &FieldValue,
        scope: Scope,
    ) -> AppResult<Option<E>> {
        (**self).query_by_field(field, value, scope).await
    }

    async fn query_many_by_keys(&self, ids: &[E::Key], scope: Scope) -> AppResult<Vec<E>> {
        (**self).query_many_by_keys(ids, scope).await
    }

    async fn query_all(&self, scope: Scope) -> AppResult<Vec<E>> {
        (**self).query_all(scope).await
    }

    async fn insert(&self, entity: &E) -> AppResult<E> {
        (**self).insert(entity).await
    }

    async fn update(&self, entity: &E, fields: &[String]) -> AppResult<E> {
        (**self).update(entity, fields).await
    }

    async fn delete(&self, entity: &E) -> AppResult<bool> {
        (**self).delete(entity).await
    }

    async fn force_delete(&self, entity: &E) -> AppResult<bool> {
        (**self).force_delete(entity).await
    }

    async fn restore(&self, entity: &E) -> AppResult<bool> {
        (**self).restore(entity).await
    }

    async fn increment(&self, id: &E::Key, field: &str, amount: i64) -> AppResult<u64> {
        (**self).increment(id, field, amount).await
    }
}
