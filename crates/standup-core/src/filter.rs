//! Record query filters and date ranges

use chrono::{Months, NaiveDate};
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::error::{Result, StandupError};
use crate::model::StatusRecord;
use crate::submission::parse_iso_date;

/// Inclusive calendar-day range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(StandupError::validation(
                "startDate",
                format!("start date {} is after end date {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month named by `YYYY-MM`
    pub fn month(value: &str) -> Result<Self> {
        let invalid = || StandupError::validation("month", format!("'{}' is not YYYY-MM", value));

        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .ok_or_else(invalid)?;

        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day in the range, ascending
    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|d| *d <= self.end)
            .collect()
    }

    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }
}

/// Raw filter parameters as received from a client
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterParams<'a> {
    pub user: Option<&'a str>,
    pub team: Option<&'a str>,
    /// Comma-joined team ids
    pub teams: Option<&'a str>,
    /// Comma-joined user ids
    pub users: Option<&'a str>,
    pub date: Option<&'a str>,
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    /// `YYYY-MM`
    pub month: Option<&'a str>,
}

/// Criteria for selecting status records; every criterion that is set must hold
///
/// `teams`/`users` of `Some(empty)` select nothing, `None` selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFilter {
    pub user: Option<Uuid>,
    pub team: Option<Uuid>,
    pub teams: Option<BTreeSet<Uuid>>,
    pub users: Option<BTreeSet<Uuid>>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub month: Option<DateRange>,
}

impl StatusFilter {
    pub fn parse(params: &FilterParams<'_>) -> Result<Self> {
        let start_date = non_blank(params.start_date)
            .map(|v| parse_iso_date("startDate", v))
            .transpose()?;
        let end_date = non_blank(params.end_date)
            .map(|v| parse_iso_date("endDate", v))
            .transpose()?;
        if let (Some(start), Some(end)) = (start_date, end_date) {
            DateRange::new(start, end)?;
        }

        Ok(Self {
            user: non_blank(params.user)
                .map(|v| parse_id("user", v))
                .transpose()?,
            team: non_blank(params.team)
                .map(|v| parse_id("team", v))
                .transpose()?,
            teams: non_blank(params.teams)
                .map(|v| parse_id_list("teams", v))
                .transpose()?,
            users: non_blank(params.users)
                .map(|v| parse_id_list("users", v))
                .transpose()?,
            date: non_blank(params.date)
                .map(|v| parse_iso_date("date", v))
                .transpose()?,
            start_date,
            end_date,
            month: non_blank(params.month).map(DateRange::month).transpose()?,
        })
    }

    /// Filter over a fixed date range, optionally narrowed to teams and users
    pub fn for_range(
        range: DateRange,
        teams: BTreeSet<Uuid>,
        users: Option<BTreeSet<Uuid>>,
    ) -> Self {
        Self {
            teams: Some(teams),
            users,
            start_date: Some(range.start),
            end_date: Some(range.end),
            ..Self::default()
        }
    }

    /// True when the filter can match no record at all
    pub fn selects_nothing(&self) -> bool {
        self.teams.as_ref().is_some_and(BTreeSet::is_empty)
            || self.users.as_ref().is_some_and(BTreeSet::is_empty)
    }

    pub fn matches(&self, record: &StatusRecord) -> bool {
        self.user.map_or(true, |u| u == record.user_id)
            && self.team.map_or(true, |t| t == record.team_id)
            && self
                .teams
                .as_ref()
                .map_or(true, |set| set.contains(&record.team_id))
            && self
                .users
                .as_ref()
                .map_or(true, |set| set.contains(&record.user_id))
            && self.date.map_or(true, |d| d == record.date)
            && self.start_date.map_or(true, |s| record.date >= s)
            && self.end_date.map_or(true, |e| record.date <= e)
            && self.month.map_or(true, |m| m.contains(record.date))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_id(field: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| StandupError::validation(field, format!("'{}' is not a valid id", value)))
}

fn parse_id_list(field: &str, value: &str) -> Result<BTreeSet<Uuid>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| parse_id(field, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StatusPayload;
    use chrono::Utc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_range() {
        let feb = DateRange::month("2024-02").unwrap();
        assert_eq!(feb.start, day(2024, 2, 1));
        assert_eq!(feb.end, day(2024, 2, 29));

        let dec = DateRange::month("2023-12").unwrap();
        assert_eq!(dec.end, day(2023, 12, 31));

        assert!(DateRange::month("2024-13").is_err());
        assert!(DateRange::month("June").is_err());
    }

    #[test]
    fn test_range_days_inclusive() {
        let range = DateRange::new(day(2024, 6, 9), day(2024, 6, 11)).unwrap();
        assert_eq!(
            range.days(),
            vec![day(2024, 6, 9), day(2024, 6, 10), day(2024, 6, 11)]
        );
        assert_eq!(range.len_days(), 3);
    }

    #[test]
    fn test_inverted_range_rejected() {
        assert!(DateRange::new(day(2024, 6, 11), day(2024, 6, 9)).is_err());

        let params = FilterParams {
            start_date: Some("2024-06-11"),
            end_date: Some("2024-06-09"),
            ..FilterParams::default()
        };
        assert!(StatusFilter::parse(&params).is_err());
    }

    #[test]
    fn test_parse_comma_lists() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let joined = format!("{}, {},", a, b);
        let params = FilterParams {
            teams: Some(joined.as_str()),
            users: Some("  "),
            ..FilterParams::default()
        };
        let filter = StatusFilter::parse(&params).unwrap();
        assert_eq!(filter.teams, Some(BTreeSet::from([a, b])));
        assert_eq!(filter.users, None);
    }

    #[test]
    fn test_parse_rejects_bad_id() {
        let params = FilterParams {
            user: Some("not-a-uuid"),
            ..FilterParams::default()
        };
        match StatusFilter::parse(&params).unwrap_err() {
            StandupError::Validation { field, .. } => assert_eq!(field, "user"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_matches_combines_criteria() {
        let team = Uuid::new_v4();
        let user = Uuid::new_v4();
        let record = StatusRecord {
            id: Uuid::new_v4(),
            team_id: team,
            user_id: user,
            date: day(2024, 6, 10),
            payload: StatusPayload::Leave {
                reason: "Holiday".to_string(),
            },
            submitted_by: user,
            submitted_at: Utc::now(),
        };

        let mut filter = StatusFilter {
            team: Some(team),
            month: Some(DateRange::month("2024-06").unwrap()),
            ..StatusFilter::default()
        };
        assert!(filter.matches(&record));

        filter.users = Some(BTreeSet::new());
        assert!(!filter.matches(&record));
        assert!(filter.selects_nothing());
    }
}
