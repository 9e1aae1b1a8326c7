//! Repository contracts.

use async_trait::async_trait;
use common::{AppError, AppResult};
use domain::{FieldValue, Record, SoftDeletable, Tracked};

/// Repository trait for dependency injection.
///
/// Lookups with an empty key or value return `None` without reaching the
/// data source. Field lookups with an empty field name are rejected.
#[async_trait]
pub trait Repository<E: Record>: Send + Sync {
    async fn find(&self, id: &E::Key) -> AppResult<Option<E>>;

    /// Found records, in no particular order. Missing keys are skipped.
    async fn find_many(&self, ids: &[E::Key]) -> AppResult<Vec<E>>;

    async fn find_one_by(&self, field: &str, value: &FieldValue) -> AppResult<Option<E>>;

    async fn all(&self) -> AppResult<Vec<E>>;

    /// Insert or update, returning `false` when a listener vetoed the insert.
    async fn persist(&self, entity: &mut Tracked<E>) -> AppResult<bool>;

    async fn remove(&self, entity: &E) -> AppResult<bool>;

    /// Re-read the record from the data source.
    async fn fresh(&self, entity: &E) -> AppResult<Option<E>>;

    /// Atomically add `amount` to an integer attribute and mirror it on `entity`.
    async fn increment_or_decrement(&self, entity: &mut E, field: &str, amount: i64)
        -> AppResult<bool>;

    fn not_found_error(&self, field: &str, value: String) -> AppError;

    async fn find_or_fail(&self, id: &E::Key) -> AppResult<E> {
        match self.find(id).await? {
            Some(entity) => Ok(entity),
            None => Err(self.not_found_error(E::KEY_FIELD, id.to_string())),
        }
    }

    async fn find_one_by_or_fail(&self, field: &str, value: &FieldValue) -> AppResult<E> {
        match self.find_one_by(field, value).await? {
            Some(entity) => Ok(entity),
            None => Err(self.not_found_error(field, value.to_string())),
        }
    }

    /// Increment and return the record as stored afterwards.
    async fn increment(&self, entity: &mut E, field: &str, amount: i64) -> AppResult<Option<E>> {
        self.increment_or_decrement(entity, field, amount).await?;
        self.find(&entity.key()).await
    }

    async fn decrement(&self, entity: &mut E, field: &str, amount: i64) -> AppResult<Option<E>> {
        self.increment(entity, field, -amount).await
    }
}

/// Repository over records that can be trashed and restored.
///
/// The plain lookups of [`Repository`] never return trashed records.
#[async_trait]
pub trait SoftDeleteRepository<E: SoftDeletable>: Repository<E> {
    async fn find_with_trashed(&self, id: &E::Key) -> AppResult<Option<E>>;

    async fn find_trashed(&self, id: &E::Key) -> AppResult<Option<E>>;

    async fn find_one_by_with_trashed(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> AppResult<Option<E>>;

    async fn find_trashed_one_by(&self, field: &str, value: &FieldValue)
        -> AppResult<Option<E>>;

    /// Clear the deletion timestamp, in the data source and on `entity`.
    async fn restore(&self, entity: &mut E) -> AppResult<bool>;

    /// Delete the row for good.
    async fn force_remove(&self, entity: &E) -> AppResult<bool>;

    async fn find_with_trashed_or_fail(&self, id: &E::Key) -> AppResult<E> {
        match self.find_with_trashed(id).await? {
            Some(entity) => Ok(entity),
            None => Err(self.not_found_error(E::KEY_FIELD, id.to_string())),
        }
    }

    async fn find_trashed_or_fail(&self, id: &E::Key) -> AppResult<E> {
        match self.find_trashed(id).await? {
            Some(entity) => Ok(entity),
            None => Err(self.not_found_error(E::KEY_FIELD, id.to_string())),
        }
    }

    async fn find_one_by_with_trashed_or_fail(
        &self,
        field: &str,
        value: &FieldValue,
    ) -> AppResult<E> {
        match self.find_one_by_with_trashed(field, value).await? {
            Some(entity) => Ok(entity),
            None => Err(self.not_found_error(field, value.to_string())),
        }
    }

    async fn find_trashed_one_by_or_fail(&self, field: &str, value: &FieldValue) -> AppResult<E> {
        match self.find_trashed_one_by(field, value).await? {
            Some(entity) => Ok(entity),
            None => Err(self.not_found_error(field, value.to_string())),
        }
    }
}
