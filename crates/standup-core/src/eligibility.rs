//! Who may overwrite an existing status record

use crate::model::{Actor, StatusRecord};

/// Whether `actor` may write the (user, team, date) slot holding `existing`
///
/// A free slot is always writable. An occupied slot is writable by whoever
/// submitted it and by any manager or admin.
pub fn can_edit(actor: &Actor, existing: Option<&StatusRecord>) -> bool {
    match existing {
        None => true,
        Some(record) => record.submitted_by == actor.id || actor.role.is_supervisor(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Role, StatusPayload};
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn record_by(submitter: Uuid) -> StatusRecord {
        StatusRecord {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            user_id: submitter,
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            payload: StatusPayload::Responses(vec![Answer {
                question_id: Uuid::new_v4(),
                answer: "Shipped the importer".to_string(),
            }]),
            submitted_by: submitter,
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn test_free_slot_is_writable_by_anyone() {
        for role in [Role::Employee, Role::Manager, Role::Admin] {
            let actor = Actor::new(Uuid::new_v4(), role);
            assert!(can_edit(&actor, None));
        }
    }

    #[test]
    fn test_submitter_may_edit_own_record() {
        let me = Uuid::new_v4();
        let record = record_by(me);
        assert!(can_edit(&Actor::new(me, Role::Employee), Some(&record)));
    }

    #[test]
    fn test_other_employee_may_not_edit() {
        let record = record_by(Uuid::new_v4());
        let other = Actor::new(Uuid::new_v4(), Role::Employee);
        assert!(!can_edit(&other, Some(&record)));
    }

    #[test]
    fn test_supervisors_may_edit_any_record() {
        let record = record_by(Uuid::new_v4());
        assert!(can_edit(
            &Actor::new(Uuid::new_v4(), Role::Manager),
            Some(&record)
        ));
        assert!(can_edit(
            &Actor::new(Uuid::new_v4(), Role::Admin),
            Some(&record)
        ));
    }
}
