use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures of a single coordinator operation. Every variant means nothing
/// was mutated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Forbidden(String),
}

impl CoordinatorError {
    pub fn kind(&self) -> &'static str {
        match self {
            CoordinatorError::Conflict(_) => "conflict",
            CoordinatorError::NotFound(_) => "not_found",
            CoordinatorError::InvalidTransition(_) => "invalid_transition",
            CoordinatorError::Unavailable(_) => "unavailable",
            CoordinatorError::Forbidden(_) => "forbidden",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("driver seed failed: {0}")]
    Seed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Coordinator(CoordinatorError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Coordinator(CoordinatorError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Coordinator(
                CoordinatorError::InvalidTransition(_)
                | CoordinatorError::Unavailable(_)
                | CoordinatorError::Forbidden(_),
            ) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::Seed(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::{AppError, CoordinatorError};

    fn status_of(err: CoordinatorError) -> StatusCode {
        AppError::from(err).into_response().status()
    }

    #[test]
    fn coordinator_errors_map_to_http_statuses() {
        assert_eq!(
            status_of(CoordinatorError::Conflict("dup".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoordinatorError::NotFound("gone".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CoordinatorError::InvalidTransition("no".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoordinatorError::Unavailable("busy".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(CoordinatorError::Forbidden("not yours".into())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn coordinator_message_is_passed_through() {
        let err = AppError::from(CoordinatorError::NotFound("ride not found".into()));
        assert_eq!(err.to_string(), "ride not found");
    }
}
