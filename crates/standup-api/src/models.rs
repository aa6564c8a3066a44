use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use standup_core::SheetFormat;
use utoipa::ToSchema;
use uuid::Uuid;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Offending input field, for validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// One answer in a status submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    /// Question ID
    pub question: String,
    /// Answer text
    pub answer: String,
}

/// Daily status submission
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStatusRequest {
    /// Team ID
    pub team: String,
    /// User the status is for
    pub user: String,
    /// Calendar day (YYYY-MM-DD)
    pub date: String,
    /// Mark the day as leave instead of answering questions
    #[serde(default)]
    pub is_leave: bool,
    /// Required when `isLeave` is set
    #[serde(default)]
    pub leave_reason: Option<String>,
    /// Answers; ignored for leave
    #[serde(default)]
    pub responses: Vec<AnswerInput>,
}

/// Whether a submission created or replaced the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubmitOutcome {
    Created,
    Updated,
}

/// An answer with its question text resolved
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseView {
    pub question_id: Uuid,
    /// Question text, if the question still exists
    pub question: Option<String>,
    pub answer: String,
}

/// Status record as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecordView {
    pub id: Uuid,
    pub team: Uuid,
    pub team_name: Option<String>,
    pub user: Uuid,
    pub user_name: Option<String>,
    pub date: NaiveDate,
    pub is_leave: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_reason: Option<String>,
    pub responses: Vec<ResponseView>,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
}

/// Submission result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitStatusResponse {
    pub status: SubmitOutcome,
    pub record: StatusRecordView,
}

/// Status record list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusRecordList {
    pub records: Vec<StatusRecordView>,
    pub total: usize,
}

/// Query parameters for listing status records
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Comma-separated team IDs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<String>,
    /// Comma-separated user IDs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// YYYY-MM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
}

/// Query parameters for the eligibility check
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EligibilityQuery {
    pub team: Option<String>,
    pub user: Option<String>,
    pub date: Option<String>,
}

/// Whether a record exists for a (team, user, date) and whether the caller may edit it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponse {
    pub exists: bool,
    pub can_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<StatusRecordView>,
}

/// Query parameters for the question form
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct QuestionQuery {
    pub team: Option<String>,
}

/// A question on the submission form
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: Uuid,
    pub text: String,
    pub is_common: bool,
    pub display_order: i32,
}

/// Submission form for a team, in display order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuestionList {
    pub team: Uuid,
    pub questions: Vec<QuestionView>,
}

/// Query parameters for report export
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    /// Comma-separated team IDs (default: every accessible team)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<String>,
    /// Comma-separated user IDs (default: every member)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// xlsx (default) or csv
    #[serde(default)]
    pub format: Option<SheetFormat>,
}
