//! Directory seeding from a YAML file
//!
//! ```yaml
//! users:
//!   - name: Mira
//!     email: mira@example.com
//!     role: manager
//!   - name: Ann
//!     email: ann@example.com
//! projects:
//!   - name: Core
//!     managers: [mira@example.com]
//! teams:
//!   - name: Platform
//!     project: Core
//!     members: [ann@example.com]
//! questions:
//!   - text: What did you do yesterday?
//!     common: true
//!     order: 1
//!   - text: Any on-call incidents?
//!     teams: [Platform]
//!     order: 2
//! ```
//!
//! Seeding is idempotent: users are matched by email, projects and teams by
//! name, questions by text. Existing rows are updated in place and missing
//! links are added; nothing is removed.

use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use standup_core::Role;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

use crate::entities::{project, project_manager, question, question_team, team, team_member, user};
use crate::error::DbError;

/// Directory file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryFile {
    #[serde(default)]
    pub users: Vec<SeedUser>,

    #[serde(default)]
    pub projects: Vec<SeedProject>,

    #[serde(default)]
    pub teams: Vec<SeedTeam>,

    #[serde(default)]
    pub questions: Vec<SeedQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub email: String,

    /// employee, manager or admin (default: employee)
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Employee
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedProject {
    pub name: String,

    /// Manager emails
    #[serde(default)]
    pub managers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedTeam {
    pub name: String,

    /// Parent project name
    pub project: Option<String>,

    /// Member emails
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedQuestion {
    pub text: String,

    /// Applies to every team (default: false)
    #[serde(default)]
    pub common: bool,

    /// Team names a scoped question applies to
    #[serde(default)]
    pub teams: Vec<String>,

    #[serde(default)]
    pub order: i32,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl DirectoryFile {
    pub fn from_yaml(content: &str) -> Result<Self, DbError> {
        serde_yaml::from_str(content).map_err(|e| DbError::InvalidSeed(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, DbError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DbError::InvalidSeed(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }
}

/// Rows written by a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub projects: usize,
    pub teams: usize,
    pub questions: usize,
}

/// Write `file` into the directory tables
///
/// Runs in one transaction: a file that fails partway leaves the tables as
/// they were.
pub async fn seed_directory<C: TransactionTrait>(
    db: &C,
    file: &DirectoryFile,
) -> Result<SeedSummary, DbError> {
    let txn = db.begin().await?;
    let summary = write_directory(&txn, file).await?;
    txn.commit().await?;
    Ok(summary)
}

async fn write_directory<C: ConnectionTrait>(
    db: &C,
    file: &DirectoryFile,
) -> Result<SeedSummary, DbError> {
    let now = Utc::now();
    let mut summary = SeedSummary::default();

    let mut users_by_email: HashMap<String, Uuid> = HashMap::new();
    for seed in &file.users {
        let email = seed.email.trim().to_ascii_lowercase();
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email.clone()))
            .one(db)
            .await?;

        let id = match existing {
            Some(model) => {
                let id = model.id;
                let mut active: user::ActiveModel = model.into();
                active.name = Set(seed.name.clone());
                active.role = Set(seed.role.into());
                active.update(db).await?;
                id
            }
            None => {
                let id = Uuid::new_v4();
                user::ActiveModel {
                    id: Set(id),
                    name: Set(seed.name.clone()),
                    email: Set(email.clone()),
                    role: Set(seed.role.into()),
                    created_at: Set(now),
                }
                .insert(db)
                .await?;
                id
            }
        };
        users_by_email.insert(email, id);
        summary.users += 1;
    }

    let mut projects_by_name: HashMap<String, Uuid> = HashMap::new();
    for seed in &file.projects {
        let id = match project::Entity::find()
            .filter(project::Column::Name.eq(seed.name.clone()))
            .one(db)
            .await?
        {
            Some(model) => model.id,
            None => {
                let id = Uuid::new_v4();
                project::ActiveModel {
                    id: Set(id),
                    name: Set(seed.name.clone()),
                    created_at: Set(now),
                }
                .insert(db)
                .await?;
                id
            }
        };

        for email in &seed.managers {
            let user_id = resolve_user(db, &users_by_email, email).await?;
            if project_manager::Entity::find_by_id((id, user_id))
                .one(db)
                .await?
                .is_none()
            {
                project_manager::ActiveModel {
                    project_id: Set(id),
                    user_id: Set(user_id),
                }
                .insert(db)
                .await?;
            }
        }

        projects_by_name.insert(seed.name.clone(), id);
        summary.projects += 1;
    }

    let mut teams_by_name: HashMap<String, Uuid> = HashMap::new();
    for seed in &file.teams {
        let project_id = match &seed.project {
            Some(name) => Some(resolve_project(db, &projects_by_name, name).await?),
            None => None,
        };

        let id = match team::Entity::find()
            .filter(team::Column::Name.eq(seed.name.clone()))
            .one(db)
            .await?
        {
            Some(model) => {
                let id = model.id;
                let mut active: team::ActiveModel = model.into();
                active.project_id = Set(project_id);
                active.update(db).await?;
                id
            }
            None => {
                let id = Uuid::new_v4();
                team::ActiveModel {
                    id: Set(id),
                    name: Set(seed.name.clone()),
                    project_id: Set(project_id),
                    created_at: Set(now),
                }
                .insert(db)
                .await?;
                id
            }
        };

        for (i, email) in seed.members.iter().enumerate() {
            let user_id = resolve_user(db, &users_by_email, email).await?;
            if team_member::Entity::find_by_id((id, user_id))
                .one(db)
                .await?
                .is_none()
            {
                team_member::ActiveModel {
                    team_id: Set(id),
                    user_id: Set(user_id),
                    joined_at: Set(now + Duration::milliseconds(i as i64)),
                }
                .insert(db)
                .await?;
            }
        }

        teams_by_name.insert(seed.name.clone(), id);
        summary.teams += 1;
    }

    for (i, seed) in file.questions.iter().enumerate() {
        let id = match question::Entity::find()
            .filter(question::Column::Text.eq(seed.text.clone()))
            .one(db)
            .await?
        {
            Some(model) => {
                let id = model.id;
                let mut active: question::ActiveModel = model.into();
                active.is_common = Set(seed.common);
                active.display_order = Set(seed.order);
                active.is_active = Set(seed.active);
                active.updated_at = Set(now);
                active.update(db).await?;
                id
            }
            None => {
                let id = Uuid::new_v4();
                // Spaced out so insertion order survives equal display orders
                let created_at = now + Duration::milliseconds(i as i64);
                question::ActiveModel {
                    id: Set(id),
                    text: Set(seed.text.clone()),
                    is_common: Set(seed.common),
                    display_order: Set(seed.order),
                    is_active: Set(seed.active),
                    created_by: Set(None),
                    created_at: Set(created_at),
                    updated_at: Set(created_at),
                }
                .insert(db)
                .await?;
                id
            }
        };

        for name in &seed.teams {
            let team_id = resolve_team(db, &teams_by_name, name).await?;
            if question_team::Entity::find_by_id((id, team_id))
                .one(db)
                .await?
                .is_none()
            {
                question_team::ActiveModel {
                    question_id: Set(id),
                    team_id: Set(team_id),
                }
                .insert(db)
                .await?;
            }
        }

        summary.questions += 1;
    }

    info!(
        "Seeded directory: {} users, {} projects, {} teams, {} questions",
        summary.users, summary.projects, summary.teams, summary.questions
    );

    Ok(summary)
}

async fn resolve_user<C: ConnectionTrait>(
    db: &C,
    seeded: &HashMap<String, Uuid>,
    email: &str,
) -> Result<Uuid, DbError> {
    let email = email.trim().to_ascii_lowercase();
    if let Some(id) = seeded.get(&email) {
        return Ok(*id);
    }
    user::Entity::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(db)
        .await?
        .map(|u| u.id)
        .ok_or_else(|| DbError::InvalidSeed(format!("unknown user '{}'", email)))
}

async fn resolve_project<C: ConnectionTrait>(
    db: &C,
    seeded: &HashMap<String, Uuid>,
    name: &str,
) -> Result<Uuid, DbError> {
    if let Some(id) = seeded.get(name) {
        return Ok(*id);
    }
    project::Entity::find()
        .filter(project::Column::Name.eq(name))
        .one(db)
        .await?
        .map(|p| p.id)
        .ok_or_else(|| DbError::InvalidSeed(format!("unknown project '{}'", name)))
}

async fn resolve_team<C: ConnectionTrait>(
    db: &C,
    seeded: &HashMap<String, Uuid>,
    name: &str,
) -> Result<Uuid, DbError> {
    if let Some(id) = seeded.get(name) {
        return Ok(*id);
    }
    team::Entity::find()
        .filter(team::Column::Name.eq(name))
        .one(db)
        .await?
        .map(|t| t.id)
        .ok_or_else(|| DbError::InvalidSeed(format!("unknown team '{}'", name)))
}
