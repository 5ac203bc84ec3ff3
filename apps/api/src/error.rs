//! Service and HTTP error types.
//!
//! ```text
//! CoreError ─┐
//!            ├──► ServiceError ──► ApiError ──► (status, {"code", "message"})
//! DbError ───┘
//! ```
//!
//! Infrastructure failures are logged here and reach the client only as a
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use teknoroma_core::{CoreError, ErrorKind, ValidationError};
use teknoroma_db::DbError;

// =============================================================================
// Service Error
// =============================================================================

/// Errors returned by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Core(e) => e.kind(),
            ServiceError::Db(e) => e.kind(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// API Error
// =============================================================================

/// What HTTP clients see.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: ErrorKind::Validation,
            message: message.into(),
        }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation
        | ErrorKind::InsufficientStock
        | ErrorKind::Duplicate
        | ErrorKind::InvalidStateTransition => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let kind = err.kind();
        let message = if kind == ErrorKind::Infrastructure {
            tracing::error!(error = %err, "Infrastructure failure");
            "An internal error occurred".to_string()
        } else {
            err.to_string()
        };

        ApiError {
            status: status_for(kind),
            code: kind,
            message,
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ServiceError::from(err).into()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ServiceError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = CoreError::not_found("Sale", "x").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError = CoreError::InsufficientStock {
            product: "Laptop".into(),
            available: 3,
            requested: 5,
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorKind::InsufficientStock);

        let err: ApiError = DbError::duplicate("barcode", "123").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_infrastructure_message_is_generic() {
        let err: ApiError = DbError::ConnectionFailed("disk on fire".into()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message.contains("disk"));
    }
}
