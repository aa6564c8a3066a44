//! User entity for the organization directory

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use standup_core::Role;

/// User role in the organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum UserRole {
    /// Submits their own status
    #[sea_orm(string_value = "employee")]
    Employee,

    /// Reviews teams of managed projects
    #[sea_orm(string_value = "manager")]
    Manager,

    /// Full access
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Employee => Role::Employee,
            UserRole::Manager => Role::Manager,
            UserRole::Admin => Role::Admin,
        }
    }
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Employee => UserRole::Employee,
            Role::Manager => UserRole::Manager,
            Role::Admin => UserRole::Admin,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User UUID (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// User email (unique)
    #[sea_orm(unique)]
    pub email: String,

    pub role: UserRole,

    /// When the user was created
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// User is a member of teams
    #[sea_orm(has_many = "super::team_member::Entity")]
    TeamMemberships,

    /// User manages projects
    #[sea_orm(has_many = "super::project_manager::Entity")]
    ManagedProjects,

    /// User owns status records
    #[sea_orm(has_many = "super::status_record::Entity")]
    StatusRecords,
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMemberships.def()
    }
}

impl Related<super::project_manager::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ManagedProjects.def()
    }
}

impl Related<super::status_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
