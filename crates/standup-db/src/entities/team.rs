//! Team entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teams")]
pub struct Model {
    /// Team UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Team name (unique, human-readable)
    #[sea_orm(unique)]
    pub name: String,

    /// Parent project; a team without one is only visible to admins
    pub project_id: Option<Uuid>,

    /// When the team was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Team belongs to a project
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Project,

    /// Team has members
    #[sea_orm(has_many = "super::team_member::Entity")]
    Members,

    /// Team has scoped questions
    #[sea_orm(has_many = "super::question_team::Entity")]
    Questions,

    /// Team owns status records
    #[sea_orm(has_many = "super::status_record::Entity")]
    StatusRecords,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::question_team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl Related<super::status_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
