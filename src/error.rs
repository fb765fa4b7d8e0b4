use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::status::InvalidStatusChange};

/// Why a roster mutation conflicts with the current game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictReason {
    /// The contact already holds a spot in this game.
    #[error("this contact has already joined the game")]
    DuplicateContact,
    /// Headcount reached capacity.
    #[error("game is full")]
    Full,
    /// Organizer locked the roster.
    #[error("game is locked")]
    Locked,
    /// Game was called off.
    #[error("game is cancelled")]
    Cancelled,
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend failed while serving the request.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Roster mutation rejected by the game state.
    #[error("conflict: {0}")]
    Conflict(ConflictReason),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ConflictReason> for ServiceError {
    fn from(reason: ConflictReason) -> Self {
        ServiceError::Conflict(reason)
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}

impl From<InvalidStatusChange> for ServiceError {
    fn from(err: InvalidStatusChange) -> Self {
        ServiceError::InvalidState(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error. The detail is logged, never returned.
    #[error("internal error")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::Internal(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::Conflict(reason) => AppError::Conflict(reason.to_string()),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed on storage");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn conflicts_map_to_409_with_reason() {
        let err: AppError = ServiceError::Conflict(ConflictReason::Full).into();
        assert_eq!(err.to_string(), "conflict: game is full");
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_failures_hide_their_detail() {
        let source = std::io::Error::other("connection reset by peer");
        let err: AppError =
            ServiceError::Unavailable(StorageError::unavailable("boom".into(), source)).into();
        assert_eq!(err.to_string(), "internal error");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_input_maps_to_400() {
        let err: AppError = ServiceError::InvalidInput("capacity must be positive".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
