//! Loads the organization directory snapshot the core operates on

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use standup_core::{Directory, Project, Question, Team, User};
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::{project, project_manager, question, question_team, team, team_member, user};
use crate::error::DbError;

/// Read users, projects, teams and questions into a [`Directory`]
///
/// Questions come back in insertion order. A team whose member list cannot
/// be read is logged and left out of the snapshot.
pub async fn load_directory<C: ConnectionTrait>(db: &C) -> Result<Directory, DbError> {
    let users: Vec<User> = user::Entity::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|u| User {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role.into(),
        })
        .collect();

    let mut managers: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in project_manager::Entity::find().all(db).await? {
        managers.entry(link.project_id).or_default().push(link.user_id);
    }

    let projects: Vec<Project> = project::Entity::find()
        .order_by_asc(project::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|p| Project {
            manager_ids: managers.remove(&p.id).unwrap_or_default(),
            id: p.id,
            name: p.name,
        })
        .collect();

    let mut teams = Vec::new();
    for t in team::Entity::find()
        .order_by_asc(team::Column::Name)
        .all(db)
        .await?
    {
        let members = team_member::Entity::find()
            .filter(team_member::Column::TeamId.eq(t.id))
            .order_by_asc(team_member::Column::JoinedAt)
            .all(db)
            .await;

        match members {
            Ok(members) => teams.push(Team {
                id: t.id,
                name: t.name,
                project_id: t.project_id,
                member_ids: members.into_iter().map(|m| m.user_id).collect(),
            }),
            Err(e) => warn!(
                "Skipping team {} ({}): failed to load members: {}",
                t.name, t.id, e
            ),
        }
    }

    let mut scopes: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for link in question_team::Entity::find().all(db).await? {
        scopes.entry(link.question_id).or_default().push(link.team_id);
    }

    let questions: Vec<Question> = question::Entity::find()
        .order_by_asc(question::Column::CreatedAt)
        .order_by_asc(question::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|q| Question {
            team_ids: scopes.remove(&q.id).unwrap_or_default(),
            id: q.id,
            text: q.text,
            is_common: q.is_common,
            display_order: q.display_order,
            is_active: q.is_active,
            created_by: q.created_by,
        })
        .collect();

    debug!(
        "Loaded directory: {} users, {} projects, {} teams, {} questions",
        users.len(),
        projects.len(),
        teams.len(),
        questions.len()
    );

    Ok(Directory::new(users, teams, projects, questions))
}
