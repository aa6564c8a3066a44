use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use sea_orm::TransactionTrait;
use standup_core::{
    can_edit, check_submission_date, parse_iso_date, render, scope_record_filter, Actor, Answer,
    Directory, FilterParams, QuestionRegistry, ReportPlan, ReportRequest, StandupError,
    StatusFilter, StatusPayload, StatusRecord, SubmissionDraft,
};
use standup_db::DbError;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::*;
use crate::AppState;

type CoreResult<T> = standup_core::Result<T>;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Submit (or resubmit) the daily status for a user on a team
#[utoipa::path(
    post,
    path = "/api/statuses",
    request_body = SubmitStatusRequest,
    responses(
        (status = 201, description = "Status record created", body = SubmitStatusResponse),
        (status = 200, description = "Existing status record updated", body = SubmitStatusResponse),
        (status = 400, description = "Invalid submission", body = ErrorResponse),
        (status = 403, description = "Not allowed to edit this record", body = ErrorResponse),
        (status = 404, description = "Unknown team, user or question", body = ErrorResponse),
        (status = 422, description = "Date outside the edit window", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "statuses"
)]
pub async fn submit_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<SubmitStatusRequest>,
) -> Result<(StatusCode, Json<SubmitStatusResponse>), crate::ApiError> {
    debug!("Status submission by {} for user {}", auth.user_id, req.user);

    submit(&state, auth.actor(), req)
        .await
        .map_err(|e| state.error(e))
}

async fn submit(
    state: &AppState,
    actor: Actor,
    req: SubmitStatusRequest,
) -> CoreResult<(StatusCode, Json<SubmitStatusResponse>)> {
    let team_id = parse_id("team", &req.team)?;
    let user_id = parse_id("user", &req.user)?;
    let date = parse_iso_date("date", &req.date)?;
    check_submission_date(date, Utc::now().date_naive())?;

    let responses = req
        .responses
        .iter()
        .map(|r| {
            Ok(Answer {
                question_id: parse_id("responses", &r.question)?,
                answer: r.answer.clone(),
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;
    let payload = SubmissionDraft {
        is_leave: req.is_leave,
        leave_reason: req.leave_reason,
        responses,
    }
    .into_payload()?;

    // Loaded before the transaction opens; single-connection pools would
    // otherwise wait on themselves.
    let directory = standup_db::load_directory(&state.db).await?;
    check_references(&directory, team_id, user_id, &payload)?;

    let txn = state.db.begin().await.map_err(DbError::from)?;
    let existing = standup_db::find_one(&txn, team_id, user_id, date).await?;
    if !can_edit(&actor, existing.as_ref()) {
        txn.rollback().await.map_err(DbError::from)?;
        return Err(StandupError::Forbidden);
    }
    let outcome = standup_db::upsert(&txn, team_id, user_id, date, &payload, &actor).await?;
    txn.commit().await.map_err(DbError::from)?;

    let (status, code) = if outcome.created {
        (SubmitOutcome::Created, StatusCode::CREATED)
    } else {
        (SubmitOutcome::Updated, StatusCode::OK)
    };
    info!(
        "Status record {} {:?} by {} (user {}, team {}, {})",
        outcome.record.id, status, actor.id, user_id, team_id, date
    );

    Ok((
        code,
        Json(SubmitStatusResponse {
            status,
            record: record_view(&directory, &outcome.record),
        }),
    ))
}

/// Unknown references are NotFound; references that exist but do not fit
/// together are validation errors.
fn check_references(
    directory: &Directory,
    team_id: Uuid,
    user_id: Uuid,
    payload: &StatusPayload,
) -> CoreResult<()> {
    let team = directory
        .team(team_id)
        .ok_or_else(|| StandupError::not_found(format!("team {}", team_id)))?;
    if directory.user(user_id).is_none() {
        return Err(StandupError::not_found(format!("user {}", user_id)));
    }
    if !team.has_member(user_id) {
        return Err(StandupError::validation(
            "user",
            format!("user {} is not a member of team {}", user_id, team.name),
        ));
    }

    let registry = QuestionRegistry::new(&directory.questions);
    let applicable = registry.applicable(team_id);
    for answer in payload.answers() {
        if registry.get(answer.question_id).is_none() {
            return Err(StandupError::not_found(format!(
                "question {}",
                answer.question_id
            )));
        }
        if !applicable.iter().any(|q| q.id == answer.question_id) {
            return Err(StandupError::validation(
                "responses",
                format!(
                    "question {} is not active for team {}",
                    answer.question_id, team.name
                ),
            ));
        }
    }

    Ok(())
}

/// List status records
#[utoipa::path(
    get,
    path = "/api/statuses",
    params(
        ("user" = Option<String>, Query, description = "Filter by user ID"),
        ("team" = Option<String>, Query, description = "Filter by team ID"),
        ("teams" = Option<String>, Query, description = "Comma-separated team IDs"),
        ("users" = Option<String>, Query, description = "Comma-separated user IDs"),
        ("date" = Option<String>, Query, description = "Exact date (YYYY-MM-DD)"),
        ("startDate" = Option<String>, Query, description = "Earliest date, inclusive"),
        ("endDate" = Option<String>, Query, description = "Latest date, inclusive"),
        ("month" = Option<String>, Query, description = "Calendar month (YYYY-MM)")
    ),
    responses(
        (status = 200, description = "Matching status records", body = StatusRecordList),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
        (status = 403, description = "Filter reaches beyond the caller's access", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "statuses"
)]
pub async fn list_statuses(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusRecordList>, crate::ApiError> {
    debug!("Listing statuses for {}: {:?}", auth.user_id, query);

    list(&state, auth.actor(), &query)
        .await
        .map_err(|e| state.error(e))
}

async fn list(
    state: &AppState,
    actor: Actor,
    query: &StatusQuery,
) -> CoreResult<Json<StatusRecordList>> {
    let filter = StatusFilter::parse(&FilterParams {
        user: query.user.as_deref(),
        team: query.team.as_deref(),
        teams: query.teams.as_deref(),
        users: query.users.as_deref(),
        date: query.date.as_deref(),
        start_date: query.start_date.as_deref(),
        end_date: query.end_date.as_deref(),
        month: query.month.as_deref(),
    })?;

    let directory = standup_db::load_directory(&state.db).await?;
    let filter = scope_record_filter(&actor, filter, &directory)?;
    let records = standup_db::find(&state.db, &filter).await?;

    let records: Vec<StatusRecordView> = records
        .iter()
        .map(|r| record_view(&directory, r))
        .collect();
    let total = records.len();

    Ok(Json(StatusRecordList { records, total }))
}

/// Whether a record exists for a (team, user, date) and whether the caller may edit it
#[utoipa::path(
    get,
    path = "/api/statuses/eligibility",
    params(
        ("team" = String, Query, description = "Team ID"),
        ("user" = String, Query, description = "User ID"),
        ("date" = String, Query, description = "Date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Eligibility", body = EligibilityResponse),
        (status = 400, description = "Missing or invalid parameter", body = ErrorResponse),
        (status = 403, description = "Record not visible to the caller", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "statuses"
)]
pub async fn check_eligibility(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<EligibilityResponse>, crate::ApiError> {
    eligibility(&state, auth.actor(), &query)
        .await
        .map_err(|e| state.error(e))
}

async fn eligibility(
    state: &AppState,
    actor: Actor,
    query: &EligibilityQuery,
) -> CoreResult<Json<EligibilityResponse>> {
    let team_id = parse_id("team", required("team", query.team.as_deref())?)?;
    let user_id = parse_id("user", required("user", query.user.as_deref())?)?;
    let date: NaiveDate = parse_iso_date("date", required("date", query.date.as_deref())?)?;

    let directory = standup_db::load_directory(&state.db).await?;
    scope_record_filter(
        &actor,
        StatusFilter {
            user: Some(user_id),
            team: Some(team_id),
            date: Some(date),
            ..StatusFilter::default()
        },
        &directory,
    )?;

    let existing = standup_db::find_one(&state.db, team_id, user_id, date).await?;

    Ok(Json(EligibilityResponse {
        exists: existing.is_some(),
        can_edit: can_edit(&actor, existing.as_ref()),
        record: existing.as_ref().map(|r| record_view(&directory, r)),
    }))
}

/// Active submission form for a team
#[utoipa::path(
    get,
    path = "/api/questions",
    params(
        ("team" = String, Query, description = "Team ID")
    ),
    responses(
        (status = 200, description = "Questions in display order", body = QuestionList),
        (status = 400, description = "Missing or invalid team", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "questions"
)]
pub async fn list_questions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuestionQuery>,
) -> Result<Json<QuestionList>, crate::ApiError> {
    questions(&state, &query).await.map_err(|e| state.error(e))
}

async fn questions(state: &AppState, query: &QuestionQuery) -> CoreResult<Json<QuestionList>> {
    let team_id = parse_id("team", required("team", query.team.as_deref())?)?;

    let directory = standup_db::load_directory(&state.db).await?;
    if directory.team(team_id).is_none() {
        return Err(StandupError::not_found(format!("team {}", team_id)));
    }

    let questions = QuestionRegistry::new(&directory.questions)
        .applicable(team_id)
        .into_iter()
        .map(|q| QuestionView {
            id: q.id,
            text: q.text.clone(),
            is_common: q.is_common,
            display_order: q.display_order,
        })
        .collect();

    Ok(Json(QuestionList {
        team: team_id,
        questions,
    }))
}

/// Export the team×user×question×date report as a spreadsheet
#[utoipa::path(
    get,
    path = "/api/reports/export",
    params(
        ("teams" = Option<String>, Query, description = "Comma-separated team IDs (default: all accessible)"),
        ("users" = Option<String>, Query, description = "Comma-separated user IDs (default: all members)"),
        ("startDate" = String, Query, description = "First date column (YYYY-MM-DD)"),
        ("endDate" = String, Query, description = "Last date column (YYYY-MM-DD)"),
        ("format" = Option<String>, Query, description = "xlsx (default) or csv")
    ),
    responses(
        (status = 200, description = "Report attachment (xlsx or csv)"),
        (status = 400, description = "Invalid range or report too large", body = ErrorResponse),
        (status = 403, description = "Not allowed to report on these teams", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn export_report(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, crate::ApiError> {
    debug!("Report export by {}: {:?}", auth.user_id, query);

    export(&state, auth.actor(), &query)
        .await
        .map_err(|e| state.error(e))
}

async fn export(state: &AppState, actor: Actor, query: &ExportQuery) -> CoreResult<Response> {
    let start = required("startDate", query.start_date.as_deref())?;
    let start = parse_iso_date("startDate", start)?;
    let end = parse_iso_date("endDate", required("endDate", query.end_date.as_deref())?)?;
    let ids = StatusFilter::parse(&FilterParams {
        teams: query.teams.as_deref(),
        users: query.users.as_deref(),
        ..FilterParams::default()
    })?;

    let request = ReportRequest {
        team_ids: ids.teams.unwrap_or_default(),
        user_ids: ids.users.unwrap_or_default(),
        start,
        end,
        max_cells: state.max_report_cells,
    };

    let directory = standup_db::load_directory(&state.db).await?;
    let plan = ReportPlan::resolve(&actor, &request, &directory)?;
    let records = standup_db::find(&state.db, &plan.filter()).await?;
    let report = plan.assemble(&directory, &records)?;
    let sheet = render(&report, query.format.unwrap_or_default())?;

    info!(
        "Exported report {} ({} rows, {} bytes) for {}",
        sheet.filename,
        report.rows.len(),
        sheet.data.len(),
        actor.id
    );

    Ok((
        [
            (header::CONTENT_TYPE, sheet.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", sheet.filename),
            ),
        ],
        sheet.data,
    )
        .into_response())
}

fn record_view(directory: &Directory, record: &StatusRecord) -> StatusRecordView {
    StatusRecordView {
        id: record.id,
        team: record.team_id,
        team_name: directory.team(record.team_id).map(|t| t.name.clone()),
        user: record.user_id,
        user_name: directory.user_name(record.user_id).map(str::to_string),
        date: record.date,
        is_leave: record.payload.is_leave(),
        leave_reason: record.payload.leave_reason().map(str::to_string),
        responses: record
            .payload
            .answers()
            .iter()
            .map(|a| ResponseView {
                question_id: a.question_id,
                question: directory.question(a.question_id).map(|q| q.text.clone()),
                answer: a.answer.clone(),
            })
            .collect(),
        submitted_by: record.submitted_by,
        submitted_at: record.submitted_at,
    }
}

fn required<'a>(field: &str, value: Option<&'a str>) -> CoreResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StandupError::validation(field, format!("{} is required", field)))
}

fn parse_id(field: &str, value: &str) -> CoreResult<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| StandupError::validation(field, format!("'{}' is not a valid id", value)))
}
