//! Post database entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use domain::Record;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub text: String,
    pub views: i64,
    /// Number of comments that are not trashed
    pub comment_count: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A post that has not been saved yet.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: 0,
            text: text.into(),
            views: 0,
            comment_count: 0,
            created_at: chrono::Utc::now(),
        }
    }
}

impl Record for Model {
    type Key = i32;
    const NAME: &'static str = "Post";

    fn key(&self) -> i32 {
        self.id
    }
}
