use chrono::NaiveDate;
use sea_orm::DbErr;
use standup_core::StandupError;
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("stored record {id} is unreadable: {reason}")]
    Corrupt { id: Uuid, reason: String },

    #[error("invalid directory file: {0}")]
    InvalidSeed(String),

    /// The slot is held by a record the writer may not overwrite
    #[error("status record for user {user_id} team {team_id} on {date} belongs to another submitter")]
    EditRefused {
        user_id: Uuid,
        team_id: Uuid,
        date: NaiveDate,
    },
}

impl From<DbError> for StandupError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::EditRefused { .. } => StandupError::Forbidden,
            other => StandupError::server_fault(other),
        }
    }
}
