//! Report planning and assembly of the team×user×question×date grid

use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::access::accessible_teams;
use crate::error::{Result, StandupError};
use crate::filter::{DateRange, StatusFilter};
use crate::model::{Actor, Directory, Question, StatusPayload, StatusRecord, Team, User};
use crate::questions::QuestionRegistry;

use super::render::{MAX_COLUMNS, MAX_ROWS};

/// What the caller asked a report for
#[derive(Debug, Clone)]
pub struct ReportRequest {
    /// Empty means every accessible team
    pub team_ids: BTreeSet<Uuid>,
    /// Empty means every member of each reported team
    pub user_ids: BTreeSet<Uuid>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Upper bound on answer cells (rows × dates)
    pub max_cells: Option<usize>,
}

/// One question row of the report grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Set on the first row of a team block only
    pub team: Option<String>,
    /// Set on the first row of a user within the block only
    pub user: Option<String>,
    pub question: String,
    /// One cell per report date; `None` when nothing was answered
    pub cells: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRow {
    Entry(ReportEntry),
    /// Blank row between two team blocks
    Separator,
}

/// A leave day of a reported user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveEntry {
    pub team: String,
    pub user: String,
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub range: DateRange,
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<ReportRow>,
    pub leave: Vec<LeaveEntry>,
}

impl Report {
    pub const FIXED_COLUMNS: [&'static str; 3] = ["Team", "User", "Question"];

    pub fn header(&self) -> Vec<String> {
        Self::FIXED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.dates.iter().map(|d| d.format("%Y-%m-%d").to_string()))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &ReportEntry> {
        self.rows.iter().filter_map(|row| match row {
            ReportRow::Entry(entry) => Some(entry),
            ReportRow::Separator => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An authorized report request, ready to fetch records for and assemble
#[derive(Debug, Clone)]
pub struct ReportPlan {
    accessible: BTreeSet<Uuid>,
    explicit_teams: bool,
    users: Option<BTreeSet<Uuid>>,
    range: DateRange,
    max_cells: Option<usize>,
}

/// Per-team block of the grid before cells are filled in
struct TeamBlock<'d> {
    team: &'d Team,
    users: Vec<&'d User>,
    questions: Vec<&'d Question>,
}

type CellKey = (Uuid, Uuid, NaiveDate);

impl ReportPlan {
    /// Check access and the date range
    ///
    /// The range must fit the date columns of one worksheet.
    pub fn resolve(actor: &Actor, request: &ReportRequest, directory: &Directory) -> Result<Self> {
        let accessible = accessible_teams(actor, &request.team_ids, directory)?;
        let range = DateRange::new(request.start, request.end)?;

        let max_days = MAX_COLUMNS - Report::FIXED_COLUMNS.len();
        if range.len_days() > max_days {
            return Err(StandupError::validation(
                "endDate",
                format!(
                    "date range spans {} days; a report holds at most {}",
                    range.len_days(),
                    max_days
                ),
            ));
        }

        Ok(Self {
            accessible,
            explicit_teams: !request.team_ids.is_empty(),
            users: (!request.user_ids.is_empty()).then(|| request.user_ids.clone()),
            range,
            max_cells: request.max_cells,
        })
    }

    /// Records the report needs from the store
    pub fn filter(&self) -> StatusFilter {
        StatusFilter::for_range(self.range, self.accessible.clone(), self.users.clone())
    }

    /// Build the grid from the fetched records
    ///
    /// Records outside the plan's filter are ignored.
    pub fn assemble(&self, directory: &Directory, records: &[StatusRecord]) -> Result<Report> {
        let filter = self.filter();
        let dates = self.range.days();

        let mut answers: HashMap<CellKey, HashMap<Uuid, &str>> = HashMap::new();
        let mut answered: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        let mut leave_days: HashMap<(Uuid, Uuid), Vec<(NaiveDate, &str)>> = HashMap::new();
        let mut record_teams = BTreeSet::new();

        for record in records.iter().filter(|r| filter.matches(r)) {
            record_teams.insert(record.team_id);
            match &record.payload {
                StatusPayload::Leave { reason } => leave_days
                    .entry((record.team_id, record.user_id))
                    .or_default()
                    .push((record.date, reason.as_str())),
                StatusPayload::Responses(list) => {
                    let cell = answers
                        .entry((record.team_id, record.user_id, record.date))
                        .or_default();
                    let team_answered = answered.entry(record.team_id).or_default();
                    for answer in list {
                        cell.insert(answer.question_id, answer.answer.as_str());
                        team_answered.insert(answer.question_id);
                    }
                }
            }
        }

        // A user-only request groups by the teams the users actually reported in.
        let team_ids = if self.users.is_some() && !self.explicit_teams {
            &record_teams
        } else {
            &self.accessible
        };

        let blocks = self.blocks(team_ids, directory, &answered);

        let row_count = blocks
            .iter()
            .map(|b| b.users.len().saturating_mul(b.questions.len()))
            .fold(blocks.len().saturating_sub(1), usize::saturating_add);
        ensure_rows_fit(row_count)?;

        let cell_count: usize = blocks
            .iter()
            .map(|b| b.users.len() * b.questions.len() * dates.len())
            .sum();
        if let Some(max) = self.max_cells {
            if cell_count > max {
                return Err(StandupError::validation(
                    "endDate",
                    format!(
                        "report would have {} cells (limit {}); narrow the date range, teams or users",
                        cell_count, max
                    ),
                ));
            }
        }
        debug!(
            "Assembling report: {} teams, {} dates, {} cells",
            blocks.len(),
            dates.len(),
            cell_count
        );

        let mut rows = Vec::new();
        let mut leave = Vec::new();
        for block in &blocks {
            if !rows.is_empty() {
                rows.push(ReportRow::Separator);
            }

            let mut team_label = Some(block.team.name.clone());
            for user in &block.users {
                let mut user_label = Some(user.name.clone());
                for question in &block.questions {
                    let cells = dates
                        .iter()
                        .map(|date| {
                            answers
                                .get(&(block.team.id, user.id, *date))
                                .and_then(|by_question| by_question.get(&question.id))
                                .map(|text| text.to_string())
                        })
                        .collect();
                    rows.push(ReportRow::Entry(ReportEntry {
                        team: team_label.take(),
                        user: user_label.take(),
                        question: question.text.clone(),
                        cells,
                    }));
                }

                if let Some(days) = leave_days.get(&(block.team.id, user.id)) {
                    let mut days = days.clone();
                    days.sort();
                    leave.extend(days.into_iter().map(|(date, reason)| LeaveEntry {
                        team: block.team.name.clone(),
                        user: user.name.clone(),
                        date,
                        reason: reason.to_string(),
                    }));
                }
            }
        }

        Ok(Report {
            range: self.range,
            dates,
            rows,
            leave,
        })
    }

    fn blocks<'d>(
        &self,
        team_ids: &BTreeSet<Uuid>,
        directory: &'d Directory,
        answered: &HashMap<Uuid, HashSet<Uuid>>,
    ) -> Vec<TeamBlock<'d>> {
        let registry = QuestionRegistry::new(&directory.questions);
        let none_answered = HashSet::new();

        let mut teams: Vec<&Team> = team_ids
            .iter()
            .filter_map(|id| directory.team(*id))
            .collect();
        teams.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        teams
            .into_iter()
            .filter_map(|team| {
                let users = self.team_users(team, directory);
                let questions = registry
                    .for_report(team.id, answered.get(&team.id).unwrap_or(&none_answered));
                (!users.is_empty() && !questions.is_empty()).then_some(TeamBlock {
                    team,
                    users,
                    questions,
                })
            })
            .collect()
    }

    fn team_users<'d>(&self, team: &Team, directory: &'d Directory) -> Vec<&'d User> {
        let mut users: Vec<&User> = team
            .member_ids
            .iter()
            .filter(|id| self.users.as_ref().map_or(true, |wanted| wanted.contains(id)))
            .filter_map(|id| directory.user(*id))
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        users.dedup_by_key(|u| u.id);
        users
    }
}

/// Header row plus `rows` must fit one worksheet
fn ensure_rows_fit(rows: usize) -> Result<()> {
    if rows >= MAX_ROWS {
        return Err(StandupError::validation(
            "teams",
            format!(
                "report would have {} rows (limit {}); narrow the teams or users",
                rows,
                MAX_ROWS - 1
            ),
        ));
    }
    Ok(())
}

/// Resolve, then assemble in one step
pub fn build_report(
    actor: &Actor,
    request: &ReportRequest,
    directory: &Directory,
    records: &[StatusRecord],
) -> Result<Report> {
    ReportPlan::resolve(actor, request, directory)?.assemble(directory, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Project, Role};
    use chrono::Utc;

    struct Org {
        directory: Directory,
        team_a: Uuid,
        team_b: Uuid,
        u1: Uuid,
        u2: Uuid,
        u3: Uuid,
        q1: Uuid,
        q2: Uuid,
        manager: Uuid,
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn user(id: Uuid, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: Role::Employee,
        }
    }

    fn question(id: Uuid, text: &str, order: i32, teams: Vec<Uuid>) -> Question {
        Question {
            id,
            text: text.to_string(),
            is_common: teams.is_empty(),
            team_ids: teams,
            display_order: order,
            is_active: true,
            created_by: None,
        }
    }

    /// Team A has U1 and U2, team B has U3; Q1 is common and Q2 is A-only
    fn org() -> Org {
        let (team_a, team_b) = (Uuid::new_v4(), Uuid::new_v4());
        let (u1, u2, u3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (q1, q2) = (Uuid::new_v4(), Uuid::new_v4());
        let manager = Uuid::new_v4();
        let project = Uuid::new_v4();

        let directory = Directory::new(
            vec![user(u1, "Ann"), user(u2, "Ben"), user(u3, "Cal")],
            vec![
                Team {
                    id: team_b,
                    name: "Beta".to_string(),
                    project_id: None,
                    member_ids: vec![u3],
                },
                Team {
                    id: team_a,
                    name: "Alpha".to_string(),
                    project_id: Some(project),
                    member_ids: vec![u2, u1],
                },
            ],
            vec![Project {
                id: project,
                name: "Core".to_string(),
                manager_ids: vec![manager],
            }],
            vec![
                question(q2, "What is blocking you?", 2, vec![team_a]),
                question(q1, "What did you do?", 1, vec![]),
            ],
        );

        Org {
            directory,
            team_a,
            team_b,
            u1,
            u2,
            u3,
            q1,
            q2,
            manager,
        }
    }

    fn responses(team: Uuid, user: Uuid, date: NaiveDate, answers: &[(Uuid, &str)]) -> StatusRecord {
        StatusRecord {
            id: Uuid::new_v4(),
            team_id: team,
            user_id: user,
            date,
            payload: StatusPayload::Responses(
                answers
                    .iter()
                    .map(|(q, a)| Answer {
                        question_id: *q,
                        answer: a.to_string(),
                    })
                    .collect(),
            ),
            submitted_by: user,
            submitted_at: Utc::now(),
        }
    }

    fn leave(team: Uuid, user: Uuid, date: NaiveDate, reason: &str) -> StatusRecord {
        StatusRecord {
            id: Uuid::new_v4(),
            team_id: team,
            user_id: user,
            date,
            payload: StatusPayload::Leave {
                reason: reason.to_string(),
            },
            submitted_by: user,
            submitted_at: Utc::now(),
        }
    }

    fn request(start: NaiveDate, end: NaiveDate) -> ReportRequest {
        ReportRequest {
            team_ids: BTreeSet::new(),
            user_ids: BTreeSet::new(),
            start,
            end,
            max_cells: None,
        }
    }

    fn entry(
        team: Option<&str>,
        user: Option<&str>,
        question: &str,
        cells: &[Option<&str>],
    ) -> ReportRow {
        ReportRow::Entry(ReportEntry {
            team: team.map(str::to_string),
            user: user.map(str::to_string),
            question: question.to_string(),
            cells: cells.iter().map(|c| c.map(str::to_string)).collect(),
        })
    }

    fn admin() -> Actor {
        Actor::new(Uuid::new_v4(), Role::Admin)
    }

    fn scenario_records(o: &Org) -> Vec<StatusRecord> {
        vec![
            responses(
                o.team_a,
                o.u1,
                day(1),
                &[(o.q1, "Wrote the parser"), (o.q2, "Waiting on review")],
            ),
            leave(o.team_a, o.u2, day(2), "Sick"),
        ]
    }

    #[test]
    fn test_two_team_scenario() {
        let o = org();
        let report = build_report(
            &admin(),
            &request(day(1), day(2)),
            &o.directory,
            &scenario_records(&o),
        )
        .unwrap();

        assert_eq!(report.dates, vec![day(1), day(2)]);
        assert_eq!(
            report.header(),
            vec!["Team", "User", "Question", "2024-06-01", "2024-06-02"]
        );
        assert_eq!(
            report.rows,
            vec![
                entry(
                    Some("Alpha"),
                    Some("Ann"),
                    "What did you do?",
                    &[Some("Wrote the parser"), None]
                ),
                entry(
                    None,
                    None,
                    "What is blocking you?",
                    &[Some("Waiting on review"), None]
                ),
                entry(None, Some("Ben"), "What did you do?", &[None, None]),
                entry(None, None, "What is blocking you?", &[None, None]),
                ReportRow::Separator,
                entry(Some("Beta"), Some("Cal"), "What did you do?", &[None, None]),
            ]
        );
        assert_eq!(
            report.leave,
            vec![LeaveEntry {
                team: "Alpha".to_string(),
                user: "Ben".to_string(),
                date: day(2),
                reason: "Sick".to_string(),
            }]
        );
    }

    #[test]
    fn test_report_is_deterministic() {
        let o = org();
        let records = scenario_records(&o);
        let first = build_report(&admin(), &request(day(1), day(2)), &o.directory, &records);
        let mut reversed = records.clone();
        reversed.reverse();
        let second = build_report(&admin(), &request(day(1), day(2)), &o.directory, &reversed);
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn test_dates_without_data_render_blank() {
        let o = org();
        let report = build_report(
            &admin(),
            &request(day(1), day(5)),
            &o.directory,
            &scenario_records(&o),
        )
        .unwrap();

        assert_eq!(report.dates.len(), 5);
        for entry in report.entries() {
            assert_eq!(entry.cells.len(), 5);
            assert!(entry.cells[1..].iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_records_outside_range_ignored() {
        let o = org();
        let records = vec![responses(o.team_b, o.u3, day(9), &[(o.q1, "Too late")])];
        let report =
            build_report(&admin(), &request(day(1), day(2)), &o.directory, &records).unwrap();
        assert!(report
            .entries()
            .all(|e| e.cells.iter().all(Option::is_none)));
    }

    #[test]
    fn test_team_without_members_emits_nothing() {
        let mut o = org();
        o.directory.teams.push(Team {
            id: Uuid::new_v4(),
            name: "Aardvark".to_string(),
            project_id: None,
            member_ids: Vec::new(),
        });

        let report = build_report(
            &admin(),
            &request(day(1), day(2)),
            &o.directory,
            &scenario_records(&o),
        )
        .unwrap();

        let separators = report
            .rows
            .iter()
            .filter(|r| matches!(r, ReportRow::Separator))
            .count();
        assert_eq!(separators, 1);
        assert_eq!(report.rows.first(), Some(&entry(
            Some("Alpha"),
            Some("Ann"),
            "What did you do?",
            &[Some("Wrote the parser"), None]
        )));
    }

    #[test]
    fn test_user_only_request_groups_by_reported_teams() {
        let o = org();
        let mut req = request(day(1), day(2));
        req.user_ids = BTreeSet::from([o.u1]);

        let report =
            build_report(&admin(), &req, &o.directory, &scenario_records(&o)).unwrap();

        assert_eq!(report.entries().count(), 2);
        assert!(report.entries().all(|e| e.team.as_deref() != Some("Beta")));
        assert!(!report.rows.contains(&ReportRow::Separator));
    }

    #[test]
    fn test_explicit_users_restricted_to_membership() {
        let o = org();
        let mut req = request(day(1), day(2));
        req.team_ids = BTreeSet::from([o.team_b]);
        req.user_ids = BTreeSet::from([o.u1]);

        let report =
            build_report(&admin(), &req, &o.directory, &scenario_records(&o)).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_inactive_question_kept_for_answered_history() {
        let mut o = org();
        for q in &mut o.directory.questions {
            if q.id == o.q2 {
                q.is_active = false;
            }
        }

        let report = build_report(
            &admin(),
            &request(day(1), day(2)),
            &o.directory,
            &scenario_records(&o),
        )
        .unwrap();
        assert_eq!(report.entries().count(), 5);

        let empty = build_report(&admin(), &request(day(1), day(2)), &o.directory, &[]).unwrap();
        assert_eq!(empty.entries().count(), 3);
    }

    #[test]
    fn test_manager_foreign_team_forbidden() {
        let o = org();
        let actor = Actor::new(o.manager, Role::Manager);
        let mut req = request(day(1), day(2));
        req.team_ids = BTreeSet::from([o.team_b]);

        assert_eq!(
            build_report(&actor, &req, &o.directory, &scenario_records(&o)),
            Err(StandupError::Forbidden)
        );
    }

    #[test]
    fn test_manager_sees_only_managed_teams() {
        let o = org();
        let actor = Actor::new(o.manager, Role::Manager);
        let report = build_report(
            &actor,
            &request(day(1), day(2)),
            &o.directory,
            &scenario_records(&o),
        )
        .unwrap();

        assert_eq!(report.entries().count(), 4);
        assert!(!report.rows.contains(&ReportRow::Separator));
    }

    #[test]
    fn test_employee_cannot_report() {
        let o = org();
        let actor = Actor::new(o.u1, Role::Employee);
        assert_eq!(
            build_report(&actor, &request(day(1), day(2)), &o.directory, &[]),
            Err(StandupError::Forbidden)
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let o = org();
        assert!(matches!(
            build_report(&admin(), &request(day(3), day(1)), &o.directory, &[]),
            Err(StandupError::Validation { .. })
        ));
    }

    #[test]
    fn test_cell_limit_enforced() {
        let o = org();
        let mut req = request(day(1), day(2));
        // 5 rows × 2 dates = 10 cells
        req.max_cells = Some(9);
        assert!(matches!(
            build_report(&admin(), &req, &o.directory, &[]),
            Err(StandupError::Validation { .. })
        ));

        req.max_cells = Some(10);
        assert!(build_report(&admin(), &req, &o.directory, &[]).is_ok());
    }

    #[test]
    fn test_range_wider_than_a_sheet_rejected() {
        let o = org();
        let err = ReportPlan::resolve(
            &admin(),
            &request(
                NaiveDate::from_ymd_opt(1, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(),
            ),
            &o.directory,
        )
        .unwrap_err();
        assert!(matches!(err, StandupError::Validation { ref field, .. } if field == "endDate"));
    }

    #[test]
    fn test_range_at_sheet_width_accepted() {
        let o = org();
        let max_days = (MAX_COLUMNS - Report::FIXED_COLUMNS.len()) as i64;
        let end = day(1) + chrono::Duration::days(max_days - 1);
        assert!(ReportPlan::resolve(&admin(), &request(day(1), end), &o.directory).is_ok());

        let too_far = end + chrono::Duration::days(1);
        assert!(ReportPlan::resolve(&admin(), &request(day(1), too_far), &o.directory).is_err());
    }

    #[test]
    fn test_row_limit() {
        assert!(ensure_rows_fit(MAX_ROWS - 1).is_ok());
        assert!(matches!(
            ensure_rows_fit(MAX_ROWS),
            Err(StandupError::Validation { ref field, .. }) if field == "teams"
        ));
    }
}
