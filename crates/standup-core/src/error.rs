//! Error taxonomy shared by every layer of the service

use chrono::NaiveDate;
use std::fmt::Display;
use thiserror::Error;

/// Errors surfaced by status submission, record queries and report export
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StandupError {
    /// Malformed or incomplete input, with the offending field
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// Submission date outside the rolling edit window
    #[error("date {date} is outside the edit window ({earliest} to {latest})")]
    InvalidDate {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    /// Actor lacks rights for the requested record or teams
    #[error("not authorized")]
    Forbidden,

    /// Referenced question, team, user or record does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Storage or rendering failure
    #[error("server fault: {0}")]
    ServerFault(String),
}

impl StandupError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn server_fault(err: impl Display) -> Self {
        Self::ServerFault(err.to_string())
    }

    /// Stable machine-readable code for API clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::InvalidDate { .. } => "INVALID_DATE",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ServerFault(_) => "SERVER_FAULT",
        }
    }
}

pub type Result<T> = std::result::Result<T, StandupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_field() {
        let err = StandupError::validation("leaveReason", "a leave reason is required");
        assert_eq!(err.to_string(), "leaveReason: a leave reason is required");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_forbidden_leaks_nothing() {
        assert_eq!(StandupError::Forbidden.to_string(), "not authorized");
    }
}
