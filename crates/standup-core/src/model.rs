//! Domain model: reference data (users, teams, projects, questions) and
//! status records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::StandupError;

/// Role of a user in the organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits their own status updates
    Employee,
    /// Reviews teams of the projects they manage
    Manager,
    /// Full access to every team
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "employee",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }

    /// Managers and admins may overwrite records submitted by others
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StandupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Role::Employee),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(StandupError::validation(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// The authenticated caller of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub project_id: Option<Uuid>,
    pub member_ids: Vec<Uuid>,
}

impl Team {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub manager_ids: Vec<Uuid>,
}

/// A question asked in the daily status form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: Uuid,
    pub text: String,
    /// Common questions apply to every team and ignore `team_ids`
    pub is_common: bool,
    pub team_ids: Vec<Uuid>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
}

impl Question {
    pub fn applies_to(&self, team_id: Uuid) -> bool {
        self.is_common || self.team_ids.contains(&team_id)
    }
}

/// Snapshot of the reference data the core operates on
///
/// `teams` and `questions` keep the order they were loaded in; questions are
/// expected in insertion order since that breaks display-order ties.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub users: HashMap<Uuid, User>,
    pub teams: Vec<Team>,
    pub projects: Vec<Project>,
    pub questions: Vec<Question>,
}

impl Directory {
    pub fn new(
        users: Vec<User>,
        teams: Vec<Team>,
        projects: Vec<Project>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            teams,
            projects,
            questions,
        }
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn team(&self, id: Uuid) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn question(&self, id: Uuid) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn user_name(&self, id: Uuid) -> Option<&str> {
        self.user(id).map(|u| u.name.as_str())
    }
}

/// One answered question inside a status record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: Uuid,
    pub answer: String,
}

/// What a status record carries: a leave marker or question responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusPayload {
    Leave { reason: String },
    Responses(Vec<Answer>),
}

impl StatusPayload {
    pub fn is_leave(&self) -> bool {
        matches!(self, StatusPayload::Leave { .. })
    }

    pub fn leave_reason(&self) -> Option<&str> {
        match self {
            StatusPayload::Leave { reason } => Some(reason),
            StatusPayload::Responses(_) => None,
        }
    }

    pub fn answers(&self) -> &[Answer] {
        match self {
            StatusPayload::Leave { .. } => &[],
            StatusPayload::Responses(answers) => answers,
        }
    }
}

/// The single record kept per (user, team, date)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub id: Uuid,
    pub team_id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub payload: StatusPayload,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!(" admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Employee).unwrap();
        assert_eq!(json, "\"employee\"");
    }

    #[test]
    fn test_question_scope() {
        let team = Uuid::new_v4();
        let other = Uuid::new_v4();
        let scoped = Question {
            id: Uuid::new_v4(),
            text: "Blockers?".to_string(),
            is_common: false,
            team_ids: vec![team],
            display_order: 0,
            is_active: true,
            created_by: None,
        };
        assert!(scoped.applies_to(team));
        assert!(!scoped.applies_to(other));

        let common = Question {
            is_common: true,
            team_ids: Vec::new(),
            ..scoped
        };
        assert!(common.applies_to(other));
    }
}
