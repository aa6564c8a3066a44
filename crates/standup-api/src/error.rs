//! Mapping of domain errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use standup_core::StandupError;
use tracing::error;

use crate::models::ErrorResponse;

const SERVER_FAULT_MESSAGE: &str = "internal server error";

/// A failed request, rendered as an [`ErrorResponse`]
#[derive(Debug)]
pub struct ApiError {
    inner: StandupError,
    /// Expose server fault details to the client
    diagnostics: bool,
}

impl ApiError {
    pub fn new(inner: StandupError, diagnostics: bool) -> Self {
        Self { inner, diagnostics }
    }

    pub fn status(&self) -> StatusCode {
        match self.inner {
            StandupError::Validation { .. } => StatusCode::BAD_REQUEST,
            StandupError::InvalidDate { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            StandupError::Forbidden => StatusCode::FORBIDDEN,
            StandupError::NotFound(_) => StatusCode::NOT_FOUND,
            StandupError::ServerFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorResponse {
        let (error, field) = match &self.inner {
            StandupError::Validation { field, .. } => {
                (self.inner.to_string(), Some(field.clone()))
            }
            StandupError::ServerFault(detail) if self.diagnostics => {
                (format!("{}: {}", SERVER_FAULT_MESSAGE, detail), None)
            }
            StandupError::ServerFault(_) => (SERVER_FAULT_MESSAGE.to_string(), None),
            other => (other.to_string(), None),
        };

        ErrorResponse {
            error,
            code: Some(self.inner.code().to_string()),
            field,
        }
    }
}

impl From<StandupError> for ApiError {
    fn from(inner: StandupError) -> Self {
        Self::new(inner, false)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let StandupError::ServerFault(detail) = &self.inner {
            error!("Request failed: {}", detail);
        }
        (self.status(), Json(self.body())).into_response()
    }
}
