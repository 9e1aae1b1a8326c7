//! Comment database entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use domain::{Record, SoftDeletable};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub post_id: Option<i32>,
    pub text: String,
    pub created_at: DateTimeUtc,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn new(post_id: Option<i32>, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            post_id,
            text: text.into(),
            created_at: chrono::Utc::now(),
            deleted_at: None,
        }
    }
}

impl Record for Model {
    type Key = i32;
    const NAME: &'static str = "Comment";

    fn key(&self) -> i32 {
        self.id
    }
}

impl SoftDeletable for Model {
    fn deleted_at(&self) -> Option<DateTimeUtc> {
        self.deleted_at
    }

    fn set_deleted_at(&mut self, at: Option<DateTimeUtc>) {
        self.deleted_at = at;
    }
}
