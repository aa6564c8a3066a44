//! Question entity: one prompt of the daily status form

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Prompt shown to the user
    #[sea_orm(column_type = "Text")]
    pub text: String,

    /// Common questions apply to every team
    pub is_common: bool,

    /// Ascending sort key; ties fall back to `created_at`
    pub display_order: i32,

    /// Inactive questions are hidden from new forms
    pub is_active: bool,

    /// User who authored the question
    pub created_by: Option<Uuid>,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Teams a scoped question applies to
    #[sea_orm(has_many = "super::question_team::Entity")]
    Teams,
}

impl Related<super::question_team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teams.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
