//! Validation of incoming status submissions

use chrono::NaiveDate;
use std::collections::HashSet;

use crate::error::{Result, StandupError};
use crate::model::{Answer, StatusPayload};

/// Parse a calendar date in ISO `YYYY-MM-DD` form
pub fn parse_iso_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        StandupError::validation(field, format!("'{}' is not an ISO date (YYYY-MM-DD)", value))
    })
}

/// A submission as it arrives on the wire, before it is known to be well-formed
#[derive(Debug, Clone, Default)]
pub struct SubmissionDraft {
    pub is_leave: bool,
    pub leave_reason: Option<String>,
    pub responses: Vec<Answer>,
}

impl SubmissionDraft {
    /// Turn the draft into a payload, trimming text and dropping blank answers
    ///
    /// Leave submissions need a non-blank reason; any responses sent along
    /// with them are ignored. Regular submissions need at least one non-blank
    /// answer, and each question may be answered once.
    pub fn into_payload(self) -> Result<StatusPayload> {
        if self.is_leave {
            let reason = self
                .leave_reason
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            if reason.is_empty() {
                return Err(StandupError::validation(
                    "leaveReason",
                    "a leave reason is required when marking leave",
                ));
            }
            return Ok(StatusPayload::Leave {
                reason: reason.to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut answers = Vec::with_capacity(self.responses.len());
        for response in self.responses {
            let text = response.answer.trim();
            if text.is_empty() {
                continue;
            }
            if !seen.insert(response.question_id) {
                return Err(StandupError::validation(
                    "responses",
                    format!("question {} is answered more than once", response.question_id),
                ));
            }
            answers.push(Answer {
                question_id: response.question_id,
                answer: text.to_string(),
            });
        }

        if answers.is_empty() {
            return Err(StandupError::validation(
                "responses",
                "at least one response is required",
            ));
        }

        Ok(StatusPayload::Responses(answers))
    }
}
