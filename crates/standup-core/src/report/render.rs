//! Spreadsheet rendering of a report as XLSX or CSV

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use super::engine::{Report, ReportRow};
use crate::error::{Result, StandupError};

/// Worksheet limits, shared with report planning
pub(crate) const MAX_COLUMNS: usize = 16_384;
pub(crate) const MAX_ROWS: usize = 1_048_576;

const TEAM_WIDTH: f64 = 22.0;
const USER_WIDTH: f64 = 22.0;
const QUESTION_WIDTH: f64 = 40.0;
const MIN_DATE_WIDTH: usize = 12;
const MAX_DATE_WIDTH: usize = 60;

const HEADER_FILL: u32 = 0xD9E1F2;
const LABEL_FILL: u32 = 0xF2F2F2;

/// Spreadsheet output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    /// Excel workbook with styling and a leave worksheet
    #[default]
    Xlsx,
    /// Plain comma-separated values
    Csv,
}

impl SheetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SheetFormat::Xlsx => "xlsx",
            SheetFormat::Csv => "csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            SheetFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            SheetFormat::Csv => "text/csv",
        }
    }
}

/// A rendered report file
#[derive(Debug, Clone)]
pub struct RenderedSheet {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
    pub filename: String,
}

/// Render `report` as a downloadable sheet
pub fn render(report: &Report, format: SheetFormat) -> Result<RenderedSheet> {
    if Report::FIXED_COLUMNS.len() + report.dates.len() > MAX_COLUMNS {
        return Err(StandupError::validation(
            "endDate",
            "date range has more days than a spreadsheet has columns",
        ));
    }
    if report.rows.len() + 1 > MAX_ROWS {
        return Err(StandupError::validation(
            "teams",
            "report has more rows than a spreadsheet can hold",
        ));
    }

    let data = match format {
        SheetFormat::Xlsx => render_xlsx(report).map_err(StandupError::server_fault)?,
        SheetFormat::Csv => render_csv(report)?,
    };

    Ok(RenderedSheet {
        data,
        mime_type: format.mime_type(),
        filename: format!(
            "status_report_{}_{}.{}",
            report.range.start.format("%Y%m%d"),
            report.range.end.format("%Y%m%d"),
            format.extension()
        ),
    })
}

struct Styles {
    header: Format,
    label: Format,
    cell: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_border(FormatBorder::Thin)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center),
            label: Format::new()
                .set_bold()
                .set_border(FormatBorder::Thin)
                .set_background_color(Color::RGB(LABEL_FILL))
                .set_align(FormatAlign::Top)
                .set_text_wrap(),
            cell: Format::new()
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Top)
                .set_text_wrap(),
        }
    }
}

fn render_xlsx(report: &Report) -> std::result::Result<Vec<u8>, XlsxError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();

    write_grid(workbook.add_worksheet(), report, &styles)?;
    write_leave(workbook.add_worksheet(), report, &styles)?;

    workbook.save_to_buffer()
}

fn write_grid(
    sheet: &mut Worksheet,
    report: &Report,
    styles: &Styles,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name("Status Report")?;

    for (col, title) in report.header().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, &styles.header)?;
    }

    sheet.set_column_width(0, TEAM_WIDTH)?;
    sheet.set_column_width(1, USER_WIDTH)?;
    sheet.set_column_width(2, QUESTION_WIDTH)?;
    for (i, width) in date_column_widths(report).into_iter().enumerate() {
        sheet.set_column_width((i + 3) as u16, width as f64)?;
    }
    sheet.set_freeze_panes(1, 3)?;

    // Separator rows are left untouched.
    for (i, row) in report.rows.iter().enumerate() {
        let ReportRow::Entry(entry) = row else {
            continue;
        };
        let row_num = (i + 1) as u32;

        for (col, label) in [(0, entry.team.as_deref()), (1, entry.user.as_deref())] {
            match label {
                Some(text) => sheet.write_string_with_format(row_num, col, text, &styles.label)?,
                None => sheet.write_blank(row_num, col, &styles.label)?,
            };
        }
        sheet.write_string_with_format(row_num, 2, &entry.question, &styles.label)?;

        for (offset, cell) in entry.cells.iter().enumerate() {
            let col = (offset + 3) as u16;
            match cell {
                Some(text) => sheet.write_string_with_format(row_num, col, text, &styles.cell)?,
                None => sheet.write_blank(row_num, col, &styles.cell)?,
            };
        }
    }

    Ok(())
}

fn write_leave(
    sheet: &mut Worksheet,
    report: &Report,
    styles: &Styles,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name("Leave")?;

    for (col, title) in ["Team", "User", "Date", "Reason"].iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &styles.header)?;
    }
    sheet.set_column_width(0, TEAM_WIDTH)?;
    sheet.set_column_width(1, USER_WIDTH)?;
    sheet.set_column_width(2, MIN_DATE_WIDTH as f64)?;
    sheet.set_column_width(3, QUESTION_WIDTH)?;

    for (i, leave) in report.leave.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string_with_format(row, 0, &leave.team, &styles.cell)?;
        sheet.write_string_with_format(row, 1, &leave.user, &styles.cell)?;
        sheet.write_string_with_format(
            row,
            2,
            leave.date.format("%Y-%m-%d").to_string(),
            &styles.cell,
        )?;
        sheet.write_string_with_format(row, 3, &leave.reason, &styles.cell)?;
    }

    Ok(())
}

/// Width per date column from its longest answer, clamped
fn date_column_widths(report: &Report) -> Vec<usize> {
    let mut widths = vec![MIN_DATE_WIDTH; report.dates.len()];
    for entry in report.entries() {
        for (width, cell) in widths.iter_mut().zip(&entry.cells) {
            if let Some(text) = cell {
                let longest_line = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                *width = (*width).max(longest_line + 2);
            }
        }
    }
    widths
        .into_iter()
        .map(|w| w.min(MAX_DATE_WIDTH))
        .collect()
}

fn render_csv(report: &Report) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let columns = Report::FIXED_COLUMNS.len() + report.dates.len();

    writer
        .write_record(report.header())
        .map_err(StandupError::server_fault)?;

    for row in &report.rows {
        let record: Vec<String> = match row {
            ReportRow::Entry(entry) => [
                entry.team.clone().unwrap_or_default(),
                entry.user.clone().unwrap_or_default(),
                entry.question.clone(),
            ]
            .into_iter()
            .chain(entry.cells.iter().map(|c| c.clone().unwrap_or_default()))
            .collect(),
            ReportRow::Separator => vec![String::new(); columns],
        };
        writer
            .write_record(&record)
            .map_err(StandupError::server_fault)?;
    }

    writer.into_inner().map_err(StandupError::server_fault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::DateRange;
    use crate::report::engine::{LeaveEntry, ReportEntry};
    use chrono::NaiveDate;

    fn sample() -> Report {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        Report {
            range: DateRange::new(start, end).unwrap(),
            dates: vec![start, end],
            rows: vec![
                ReportRow::Entry(ReportEntry {
                    team: Some("Alpha".to_string()),
                    user: Some("Ann".to_string()),
                    question: "What did you do?".to_string(),
                    cells: vec![Some("Wrote, tested".to_string()), None],
                }),
                ReportRow::Separator,
                ReportRow::Entry(ReportEntry {
                    team: Some("Beta".to_string()),
                    user: Some("Cal".to_string()),
                    question: "What did you do?".to_string(),
                    cells: vec![None, None],
                }),
            ],
            leave: vec![LeaveEntry {
                team: "Alpha".to_string(),
                user: "Ben".to_string(),
                date: end,
                reason: "Sick".to_string(),
            }],
        }
    }

    #[test]
    fn test_csv_layout() {
        let sheet = render(&sample(), SheetFormat::Csv).unwrap();
        let text = String::from_utf8(sheet.data).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Team,User,Question,2024-06-01,2024-06-02",
                "Alpha,Ann,What did you do?,\"Wrote, tested\",",
                ",,,,",
                "Beta,Cal,What did you do?,,",
            ]
        );
        assert_eq!(sheet.mime_type, "text/csv");
        assert_eq!(sheet.filename, "status_report_20240601_20240602.csv");
    }

    #[test]
    fn test_xlsx_is_a_zip_container() {
        let sheet = render(&sample(), SheetFormat::Xlsx).unwrap();
        assert!(sheet.data.starts_with(b"PK"));
        assert_eq!(sheet.filename, "status_report_20240601_20240602.xlsx");
    }

    #[test]
    fn test_date_widths_follow_longest_answer() {
        let mut report = sample();
        if let ReportRow::Entry(entry) = &mut report.rows[0] {
            entry.cells[1] = Some("x".repeat(200));
        }
        assert_eq!(date_column_widths(&report), vec![15, MAX_DATE_WIDTH]);
    }

    #[test]
    fn test_format_deserializes_lowercase() {
        let format: SheetFormat = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(format, SheetFormat::Csv);
        assert_eq!(SheetFormat::default(), SheetFormat::Xlsx);
    }
}
