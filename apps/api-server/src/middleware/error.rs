//! Application error type and its response mapping.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use techlog_core::error::RepoError;
use techlog_core::ports::AuthError;
use techlog_shared::ErrorResponse;
use techlog_shared::dto::InvalidQuery;

/// Handler-level error. Everything a handler can fail with converges
/// here and renders as the `{error, details}` envelope.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail.clone()),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail.clone()),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail.clone()),
            AppError::Internal(detail) => {
                // Detail is logged, never serialized.
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) | RepoError::Query(msg) => {
                AppError::Internal(format!("database error: {msg}"))
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Exchange(msg) => AppError::Internal(format!("oauth exchange: {msg}")),
            _ => AppError::Unauthorized,
        }
    }
}

impl From<InvalidQuery> for AppError {
    fn from(err: InvalidQuery) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_not_found_maps_to_404() {
        let err = AppError::from(RepoError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn internal_detail_is_not_leaked() {
        let err = AppError::Internal("connection refused at 10.0.0.3".to_string());
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Internal server error"));
        assert!(!text.contains("10.0.0.3"));
    }

    #[test]
    fn invalid_query_maps_to_400() {
        let err = AppError::from(InvalidQuery("invalid company id: xyz".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("invalid company id"));
    }
}
