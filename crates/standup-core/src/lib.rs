//! Status reporting core
//!
//! Pure domain logic for daily status updates: the data model, submission
//! validation, the rolling edit window, edit eligibility, access scoping and
//! the team×user×question×date report engine. Nothing in this crate touches
//! storage or transport; callers hand in a [`Directory`] snapshot and the
//! records they fetched.

pub mod access;
pub mod eligibility;
pub mod error;
pub mod filter;
pub mod model;
pub mod questions;
pub mod report;
pub mod submission;
pub mod window;

pub use access::{accessible_teams, managed_teams, scope_record_filter};
pub use eligibility::can_edit;
pub use error::{Result, StandupError};
pub use filter::{DateRange, FilterParams, StatusFilter};
pub use model::{
    Actor, Answer, Directory, Project, Question, Role, StatusPayload, StatusRecord, Team, User,
};
pub use questions::QuestionRegistry;
pub use report::{
    build_report, render, LeaveEntry, RenderedSheet, Report, ReportEntry, ReportPlan,
    ReportRequest, ReportRow, SheetFormat,
};
pub use submission::{parse_iso_date, SubmissionDraft};
pub use window::{check_submission_date, is_allowed, EDIT_WINDOW_DAYS};
