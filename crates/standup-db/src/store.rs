//! Status Record Store: one record per (user, team, date)

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set,
};
use standup_core::{Actor, Answer, StatusFilter, StatusPayload, StatusRecord};
use tracing::debug;
use uuid::Uuid;

use crate::entities::status_record;
use crate::error::DbError;

/// Result of an upsert
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOutcome {
    pub record: StatusRecord,
    /// `false` when an existing record was overwritten in place
    pub created: bool,
}

/// Fetch the record for a (team, user, date) triple
pub async fn find_one<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<Option<StatusRecord>, DbError> {
    let model = status_record::Entity::find()
        .filter(status_record::Column::UserId.eq(user_id))
        .filter(status_record::Column::TeamId.eq(team_id))
        .filter(status_record::Column::Date.eq(date))
        .one(db)
        .await?;

    model.map(into_record).transpose()
}

/// Insert or overwrite the record for a triple on behalf of `actor`
///
/// The write is a single `INSERT ... ON CONFLICT DO UPDATE` against the
/// unique triple index, so the record keeps its identity across updates.
/// Unless `actor` is a supervisor the update only applies to rows `actor`
/// submitted; a record that appeared under someone else in the meantime
/// yields [`DbError::EditRefused`].
pub async fn upsert<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    payload: &StatusPayload,
    actor: &Actor,
) -> Result<UpsertOutcome, DbError> {
    let fresh_id = Uuid::new_v4();
    let responses = serde_json::to_string(payload.answers()).map_err(|e| DbError::Corrupt {
        id: fresh_id,
        reason: e.to_string(),
    })?;

    let active = status_record::ActiveModel {
        id: Set(fresh_id),
        team_id: Set(team_id),
        user_id: Set(user_id),
        date: Set(date),
        is_leave: Set(payload.is_leave()),
        leave_reason: Set(payload.leave_reason().map(str::to_string)),
        responses: Set(responses),
        submitted_by: Set(actor.id),
        submitted_at: Set(Utc::now()),
    };

    let mut on_conflict = OnConflict::columns([
        status_record::Column::UserId,
        status_record::Column::TeamId,
        status_record::Column::Date,
    ])
    .update_columns([
        status_record::Column::IsLeave,
        status_record::Column::LeaveReason,
        status_record::Column::Responses,
        status_record::Column::SubmittedBy,
        status_record::Column::SubmittedAt,
    ])
    .to_owned();
    if !actor.role.is_supervisor() {
        on_conflict.action_and_where(
            Expr::col((status_record::Entity, status_record::Column::SubmittedBy)).eq(actor.id),
        );
    }

    let written = match status_record::Entity::insert(active)
        .on_conflict(on_conflict)
        .exec_without_returning(db)
        .await
    {
        Ok(rows) => rows,
        Err(DbErr::RecordNotInserted) => 0,
        Err(e) => return Err(e.into()),
    };
    if written == 0 {
        debug!(
            "Refused overwrite by {} (user {}, team {}, {})",
            actor.id, user_id, team_id, date
        );
        return Err(DbError::EditRefused {
            user_id,
            team_id,
            date,
        });
    }

    let record = find_one(db, team_id, user_id, date)
        .await?
        .ok_or_else(|| {
            DbError::Database(DbErr::RecordNotFound(format!(
                "status record for user {} team {} on {}",
                user_id, team_id, date
            )))
        })?;
    let created = record.id == fresh_id;

    debug!(
        "{} status record {} (user {}, team {}, {})",
        if created { "Created" } else { "Updated" },
        record.id,
        user_id,
        team_id,
        date
    );

    Ok(UpsertOutcome { record, created })
}

/// Records matching every criterion of `filter`, ordered by
/// (date, team id, user id)
pub async fn find<C: ConnectionTrait>(
    db: &C,
    filter: &StatusFilter,
) -> Result<Vec<StatusRecord>, DbError> {
    if filter.selects_nothing() {
        return Ok(Vec::new());
    }

    let mut condition = Condition::all();
    if let Some(user) = filter.user {
        condition = condition.add(status_record::Column::UserId.eq(user));
    }
    if let Some(team) = filter.team {
        condition = condition.add(status_record::Column::TeamId.eq(team));
    }
    if let Some(teams) = &filter.teams {
        condition = condition.add(status_record::Column::TeamId.is_in(teams.iter().copied()));
    }
    if let Some(users) = &filter.users {
        condition = condition.add(status_record::Column::UserId.is_in(users.iter().copied()));
    }
    if let Some(date) = filter.date {
        condition = condition.add(status_record::Column::Date.eq(date));
    }
    if let Some(start) = filter.start_date {
        condition = condition.add(status_record::Column::Date.gte(start));
    }
    if let Some(end) = filter.end_date {
        condition = condition.add(status_record::Column::Date.lte(end));
    }
    if let Some(month) = &filter.month {
        condition = condition.add(status_record::Column::Date.between(month.start, month.end));
    }

    let models = status_record::Entity::find()
        .filter(condition)
        .order_by_asc(status_record::Column::Date)
        .order_by_asc(status_record::Column::TeamId)
        .order_by_asc(status_record::Column::UserId)
        .all(db)
        .await?;

    debug!("Status query matched {} records", models.len());

    models.into_iter().map(into_record).collect()
}

fn into_record(model: status_record::Model) -> Result<StatusRecord, DbError> {
    let payload = if model.is_leave {
        StatusPayload::Leave {
            reason: model.leave_reason.unwrap_or_default(),
        }
    } else {
        let answers: Vec<Answer> =
            serde_json::from_str(&model.responses).map_err(|e| DbError::Corrupt {
                id: model.id,
                reason: e.to_string(),
            })?;
        StatusPayload::Responses(answers)
    };

    Ok(StatusRecord {
        id: model.id,
        team_id: model.team_id,
        user_id: model.user_id,
        date: model.date,
        payload,
        submitted_by: model.submitted_by,
        submitted_at: model.submitted_at,
    })
}
