//! Access scoping: which teams and records an actor may see

use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::{Result, StandupError};
use crate::filter::StatusFilter;
use crate::model::{Actor, Directory, Role};

/// Teams belonging to projects that `manager_id` manages
pub fn managed_teams(manager_id: Uuid, directory: &Directory) -> BTreeSet<Uuid> {
    let projects: BTreeSet<Uuid> = directory
        .projects
        .iter()
        .filter(|p| p.manager_ids.contains(&manager_id))
        .map(|p| p.id)
        .collect();

    directory
        .teams
        .iter()
        .filter(|t| t.project_id.is_some_and(|p| projects.contains(&p)))
        .map(|t| t.id)
        .collect()
}

/// Teams `actor` may include in a report
///
/// An empty `requested` means "everything the actor can see". A non-empty
/// request must be fully visible to the actor, otherwise the whole request is
/// refused. Employees never get report access.
pub fn accessible_teams(
    actor: &Actor,
    requested: &BTreeSet<Uuid>,
    directory: &Directory,
) -> Result<BTreeSet<Uuid>> {
    match actor.role {
        Role::Employee => Err(StandupError::Forbidden),
        Role::Admin => {
            if requested.is_empty() {
                return Ok(directory.teams.iter().map(|t| t.id).collect());
            }
            if let Some(missing) = requested.iter().find(|id| directory.team(**id).is_none()) {
                return Err(StandupError::not_found(format!("team {}", missing)));
            }
            Ok(requested.clone())
        }
        Role::Manager => {
            let managed = managed_teams(actor.id, directory);
            if requested.is_empty() {
                return Ok(managed);
            }
            if requested.is_subset(&managed) {
                Ok(requested.clone())
            } else {
                Err(StandupError::Forbidden)
            }
        }
    }
}

/// Narrow a record query to what `actor` may read
///
/// Employees only read their own records. Managers read records of the teams
/// they manage, plus their own. Admins read everything.
pub fn scope_record_filter(
    actor: &Actor,
    mut filter: StatusFilter,
    directory: &Directory,
) -> Result<StatusFilter> {
    match actor.role {
        Role::Admin => Ok(filter),
        Role::Employee => {
            if filter.user.is_some_and(|u| u != actor.id) {
                return Err(StandupError::Forbidden);
            }
            if let Some(users) = &filter.users {
                if users.iter().any(|u| *u != actor.id) {
                    return Err(StandupError::Forbidden);
                }
            }
            filter.user = Some(actor.id);
            Ok(filter)
        }
        Role::Manager => {
            let own_records_only = filter.user == Some(actor.id)
                && filter.team.is_none()
                && filter.teams.is_none();
            if own_records_only {
                return Ok(filter);
            }

            let managed = managed_teams(actor.id, directory);
            if filter.team.is_some_and(|t| !managed.contains(&t)) {
                return Err(StandupError::Forbidden);
            }
            match &filter.teams {
                Some(teams) if !teams.is_subset(&managed) => Err(StandupError::Forbidden),
                Some(_) => Ok(filter),
                None => {
                    filter.teams = Some(managed);
                    Ok(filter)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Project, Team, User};

    struct Fixture {
        directory: Directory,
        manager: Uuid,
        managed_team: Uuid,
        foreign_team: Uuid,
    }

    fn fixture() -> Fixture {
        let manager = Uuid::new_v4();
        let project = Uuid::new_v4();
        let other_project = Uuid::new_v4();
        let managed_team = Uuid::new_v4();
        let foreign_team = Uuid::new_v4();

        let directory = Directory::new(
            vec![User {
                id: manager,
                name: "Mira".to_string(),
                email: "mira@example.com".to_string(),
                role: Role::Manager,
            }],
            vec![
                Team {
                    id: managed_team,
                    name: "Platform".to_string(),
                    project_id: Some(project),
                    member_ids: Vec::new(),
                },
                Team {
                    id: foreign_team,
                    name: "Billing".to_string(),
                    project_id: Some(other_project),
                    member_ids: Vec::new(),
                },
            ],
            vec![
                Project {
                    id: project,
                    name: "Core".to_string(),
                    manager_ids: vec![manager],
                },
                Project {
                    id: other_project,
                    name: "Money".to_string(),
                    manager_ids: Vec::new(),
                },
            ],
            Vec::new(),
        );

        Fixture {
            directory,
            manager,
            managed_team,
            foreign_team,
        }
    }

    #[test]
    fn test_employee_never_reports() {
        let f = fixture();
        let actor = Actor::new(Uuid::new_v4(), Role::Employee);
        assert_eq!(
            accessible_teams(&actor, &BTreeSet::new(), &f.directory),
            Err(StandupError::Forbidden)
        );
    }

    #[test]
    fn test_admin_sees_all_teams() {
        let f = fixture();
        let actor = Actor::new(Uuid::new_v4(), Role::Admin);
        let teams = accessible_teams(&actor, &BTreeSet::new(), &f.directory).unwrap();
        assert_eq!(teams, BTreeSet::from([f.managed_team, f.foreign_team]));
    }

    #[test]
    fn test_admin_unknown_team_not_found() {
        let f = fixture();
        let actor = Actor::new(Uuid::new_v4(), Role::Admin);
        let requested = BTreeSet::from([Uuid::new_v4()]);
        assert!(matches!(
            accessible_teams(&actor, &requested, &f.directory),
            Err(StandupError::NotFound(_))
        ));
    }

    #[test]
    fn test_manager_limited_to_managed_projects() {
        let f = fixture();
        let actor = Actor::new(f.manager, Role::Manager);

        let all = accessible_teams(&actor, &BTreeSet::new(), &f.directory).unwrap();
        assert_eq!(all, BTreeSet::from([f.managed_team]));

        let requested = BTreeSet::from([f.managed_team]);
        assert_eq!(
            accessible_teams(&actor, &requested, &f.directory).unwrap(),
            requested
        );
    }

    #[test]
    fn test_manager_requesting_foreign_team_forbidden() {
        let f = fixture();
        let actor = Actor::new(f.manager, Role::Manager);

        let foreign = BTreeSet::from([f.foreign_team]);
        assert_eq!(
            accessible_teams(&actor, &foreign, &f.directory),
            Err(StandupError::Forbidden)
        );

        let mixed = BTreeSet::from([f.managed_team, f.foreign_team]);
        assert_eq!(
            accessible_teams(&actor, &mixed, &f.directory),
            Err(StandupError::Forbidden)
        );
    }

    #[test]
    fn test_employee_records_forced_to_self() {
        let f = fixture();
        let me = Uuid::new_v4();
        let actor = Actor::new(me, Role::Employee);

        let scoped = scope_record_filter(&actor, StatusFilter::default(), &f.directory).unwrap();
        assert_eq!(scoped.user, Some(me));

        let snooping = StatusFilter {
            user: Some(Uuid::new_v4()),
            ..StatusFilter::default()
        };
        assert_eq!(
            scope_record_filter(&actor, snooping, &f.directory),
            Err(StandupError::Forbidden)
        );
    }

    #[test]
    fn test_manager_records_limited_to_managed_teams() {
        let f = fixture();
        let actor = Actor::new(f.manager, Role::Manager);

        let scoped = scope_record_filter(&actor, StatusFilter::default(), &f.directory).unwrap();
        assert_eq!(scoped.teams, Some(BTreeSet::from([f.managed_team])));

        let foreign = StatusFilter {
            team: Some(f.foreign_team),
            ..StatusFilter::default()
        };
        assert_eq!(
            scope_record_filter(&actor, foreign, &f.directory),
            Err(StandupError::Forbidden)
        );

        let own = StatusFilter {
            user: Some(f.manager),
            ..StatusFilter::default()
        };
        assert_eq!(
            scope_record_filter(&actor, own.clone(), &f.directory).unwrap(),
            own
        );
    }
}
