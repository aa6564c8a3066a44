//! Status report: the team×user×question×date matrix and its spreadsheet form

mod engine;
mod render;

pub use engine::{
    build_report, LeaveEntry, Report, ReportEntry, ReportPlan, ReportRequest, ReportRow,
};
pub use render::{render, RenderedSheet, SheetFormat};
