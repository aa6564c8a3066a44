//! Rolling edit window for submissions

use chrono::{Duration, NaiveDate};

use crate::error::{Result, StandupError};

/// How many days before today a submission may still be made or corrected
pub const EDIT_WINDOW_DAYS: i64 = 2;

/// Whether `date` lies in `[today - EDIT_WINDOW_DAYS, today]`
pub fn is_allowed(date: NaiveDate, today: NaiveDate) -> bool {
    let earliest = today - Duration::days(EDIT_WINDOW_DAYS);
    earliest <= date && date <= today
}

/// Reject submissions outside the edit window
///
/// `today` must come from the server clock.
pub fn check_submission_date(date: NaiveDate, today: NaiveDate) -> Result<()> {
    if is_allowed(date, today) {
        return Ok(());
    }
    Err(StandupError::InvalidDate {
        date,
        earliest: today - Duration::days(EDIT_WINDOW_DAYS),
        latest: today,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_window_is_inclusive() {
        let today = day("2024-06-10");
        assert!(is_allowed(day("2024-06-08"), today));
        assert!(is_allowed(day("2024-06-09"), today));
        assert!(is_allowed(day("2024-06-10"), today));
    }

    #[test]
    fn test_window_rejects_outside_dates() {
        let today = day("2024-06-10");
        assert!(!is_allowed(day("2024-06-07"), today));
        assert!(!is_allowed(day("2024-06-11"), today));
    }

    #[test]
    fn test_window_across_month_boundary() {
        let today = day("2024-03-01");
        assert!(is_allowed(day("2024-02-28"), today));
        assert!(!is_allowed(day("2024-02-27"), today));
    }

    #[test]
    fn test_check_reports_window_bounds() {
        let err = check_submission_date(day("2024-06-01"), day("2024-06-10")).unwrap_err();
        assert_eq!(
            err,
            StandupError::InvalidDate {
                date: day("2024-06-01"),
                earliest: day("2024-06-08"),
                latest: day("2024-06-10"),
            }
        );
    }
}
