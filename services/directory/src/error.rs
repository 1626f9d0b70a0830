//! Custom error types for the directory service

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{
    geocode::GeocodeError, repositories::RepositoryError, session::SessionError,
    validation::ValidationError,
};

/// Custom error type for the directory service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// No valid session, or wrong credentials
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid session without the required role
    #[error("{0}")]
    Forbidden(String),

    /// Unique constraint violation
    #[error("{0}")]
    Conflict(String),

    /// Login locked out after repeated failures
    #[error("Too many login attempts, try again later")]
    TooManyAttempts,

    /// Geocoding service unreachable or errored
    #[error("Geocoding failed")]
    Upstream,

    /// Query, connection or session backend failure
    #[error("{0}")]
    Store(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Validation(error.0)
    }
}

impl From<RepositoryError> for ApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict(_) => ApiError::Conflict("Username already exists".to_string()),
            other => {
                error!("Store operation failed: {}", other);
                ApiError::Store(other.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        error!("Session store failed: {}", error);
        ApiError::Store("Session store error".to_string())
    }
}

impl From<GeocodeError> for ApiError {
    fn from(error: GeocodeError) -> Self {
        error!("Geocoding error: {}", error);
        ApiError::Upstream
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("All fields are required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthenticated("Invalid username or password".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("Admin access required".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Conflict("Username already exists".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::TooManyAttempts.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::Upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_repository_errors() {
        let conflict = ApiError::from(RepositoryError::Conflict("jane".into()));
        assert_eq!(conflict.to_string(), "Username already exists");
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let store = ApiError::from(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(store.to_string().starts_with("Database error"));
    }
}
