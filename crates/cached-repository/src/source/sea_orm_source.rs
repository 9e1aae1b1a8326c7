//! Data source backed by a sea-orm entity.

use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AppError, AppResult};
use domain::{FieldValue, Record, RecordKey};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, IntoActiveModel, Iterable, PrimaryKeyToColumn, QueryFilter, QueryOrder,
    Select, Value,
};

use super::{DataSource, Scope};

/// Source reading and writing one table through its sea-orm entity `Ent`
/// and active model `A`.
///
/// Attribute names are the entity's column names.
pub struct SeaOrmSource<Ent: EntityTrait, A> {
    db: DatabaseConnection,
    soft_delete_column: Option<Ent::Column>,
    _active: PhantomData<fn() -> A>,
}

impl<Ent: EntityTrait, A> SeaOrmSource<Ent, A> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            soft_delete_column: None,
            _active: PhantomData,
        }
    }

    /// Hide rows whose `column` is set instead of deleting them.
    pub fn soft_deletes(mut self, column: Ent::Column) -> Self {
        self.soft_delete_column = Some(column);
        self
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn column(field: &str) -> AppResult<Ent::Column> {
        <Ent::Column as FromStr>::from_str(field).map_err(|_| {
            AppError::invalid_argument(format!(
                "Unknown column `{}` on table `{}`",
                field,
                Ent::default().table_name()
            ))
        })
    }

    fn primary_key() -> AppResult<Ent::Column> {
        Ent::PrimaryKey::iter()
            .next()
            .map(|key| key.into_column())
            .ok_or_else(|| AppError::internal("entity has no primary key column"))
    }

    fn scoped(&self, select: Select<Ent>, scope: Scope) -> Select<Ent> {
        match (self.soft_delete_column, scope) {
            (Some(column), Scope::Default) => select.filter(column.is_null()),
            (Some(column), Scope::OnlyTrashed) => select.filter(column.is_not_null()),
            _ => select,
        }
    }
}

#[async_trait]
impl<Ent, E, A> DataSource<E> for SeaOrmSource<Ent, A>
where
    Ent: EntityTrait<Model = E>,
    E: Record + FromQueryResult + IntoActiveModel<A>,
    E::Key: Into<Value>,
    A: ActiveModelTrait<Entity = Ent> + ActiveModelBehavior + Send + 'static,
{
    async fn query_by_key(&self, id: &E::Key, scope: Scope) -> AppResult<Option<E>> {
        let select = Ent::find().filter(Self::primary_key()?.eq(id.clone()));
        Ok(self.scoped(select, scope).one(&self.db).await?)
    }

    async fn query_by_field(
        &self,
        field: &str,
        value: &FieldValue,
        scope: Scope,
    ) -> AppResult<Option<E>> {
        let select = Ent::find()
            .filter(Self::column(field)?.eq(db_value(value)))
            .order_by_asc(Self::primary_key()?);
        Ok(self.scoped(select, scope).one(&self.db).await?)
    }

    async fn query_many_by_keys(&self, ids: &[E::Key], scope: Scope) -> AppResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let select = Ent::find().filter(Self::primary_key()?.is_in(ids.iter().cloned()));
        Ok(self.scoped(select, scope).all(&self.db).await?)
    }

    async fn query_all(&self, scope: Scope) -> AppResult<Vec<E>> {
        let select = Ent::find().order_by_asc(Self::primary_key()?);
        Ok(self.scoped(select, scope).all(&self.db).await?)
    }

    async fn insert(&self, entity: &E) -> AppResult<E> {
        let mut model: A = entity.clone().into_active_model();
        for column in Ent::Column::iter() {
            if let Some(value) = model.get(column).into_value() {
                model.set(column, value);
            }
        }
        if entity.key().is_empty() {
            model.not_set(Self::primary_key()?);
        }

        let saved = model.insert(&self.db).await?;
        tracing::debug!(table = %Ent::default().table_name(), key = %saved.key(), "Inserted row");
        Ok(saved)
    }

    async fn update(&self, entity: &E, fields: &[String]) -> AppResult<E> {
        if fields.is_empty() {
            return Ok(entity.clone());
        }

        let mut model: A = entity.clone().into_active_model();
        for field in fields {
            let column = Self::column(field)?;
            if let Some(value) = model.get(column).into_value() {
                model.set(column, value);
            }
        }

        Ok(model.update(&self.db).await?)
    }

    async fn delete(&self, entity: &E) -> AppResult<bool> {
        let Some(column) = self.soft_delete_column else {
            return self.force_delete(entity).await;
        };

        let result = Ent::update_many()
            .col_expr(column, Expr::value(Utc::now()))
            .filter(Self::primary_key()?.eq(entity.key()))
            .filter(column.is_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn force_delete(&self, entity: &E) -> AppResult<bool> {
        let result = Ent::delete_many()
            .filter(Self::primary_key()?.eq(entity.key()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn restore(&self, entity: &E) -> AppResult<bool> {
        let column = self.soft_delete_column.ok_or_else(|| {
            AppError::invalid_argument(format!("{} records are not soft deleted", E::NAME))
        })?;

        let result = Ent::update_many()
            .col_expr(column, Expr::value(Option::<DateTime<Utc>>::None))
            .filter(Self::primary_key()?.eq(entity.key()))
            .filter(column.is_not_null())
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn increment(&self, id: &E::Key, field: &str, amount: i64) -> AppResult<u64> {
        let column = Self::column(field)?;
        let result = Ent::update_many()
            .col_expr(column, Expr::col(column).add(amount))
            .filter(Self::primary_key()?.eq(id.clone()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}

fn db_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => s.clone().into(),
        FieldValue::Int(i) => (*i).into(),
        FieldValue::Bool(b) => (*b).into(),
        FieldValue::Uuid(u) => (*u).into(),
    }
}
