//! Service-error to HTTP-response mapping.
//!
//! # Responsibility
//! - Give every failure a stable kind, a status code, and a human-readable
//!   message safe to return to clients.
//!
//! # Invariants
//! - Store failures are logged with their detail and returned generically.
//! - Credential mismatches never reveal which field was wrong.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use daymark_core::ServiceError;
use log::error;
use serde::Serialize;

/// Stable JSON error body: `{"error": <kind>, "message": <text>}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            kind: "unauthorized",
            message: "Missing or invalid credential".to_string(),
        }
    }

    pub fn lock_poisoned() -> Self {
        error!("event=request module=http status=error error=connection lock poisoned");
        Self::server_error()
    }

    fn server_error() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "store_unavailable",
            message: "Server error".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(message) => Self {
                status: StatusCode::BAD_REQUEST,
                kind: "validation_error",
                message,
            },
            ServiceError::InvalidCredentials => Self {
                status: StatusCode::BAD_REQUEST,
                kind: "invalid_credentials",
                message: "Invalid credentials".to_string(),
            },
            ServiceError::NotFound => Self {
                status: StatusCode::NOT_FOUND,
                kind: "not_found",
                message: "Task not found".to_string(),
            },
            ServiceError::Store(err) => {
                error!("event=request module=http status=error error={err}");
                Self::server_error()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use daymark_core::{RepoError, ServiceError};

    #[test]
    fn validation_maps_to_bad_request_with_its_message() {
        let err = ApiError::from(ServiceError::Validation("email address is not valid".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "validation_error");
    }

    #[test]
    fn invalid_credentials_maps_to_generic_bad_request() {
        let err = ApiError::from(ServiceError::InvalidCredentials);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "invalid_credentials");
        assert_eq!(err.message, "Invalid credentials");
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::from(ServiceError::NotFound);
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn store_failures_map_to_500_without_detail() {
        let inner = RepoError::InvalidData("secret table detail".to_string());
        let err = ApiError::from(ServiceError::Store(inner));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "store_unavailable");
        assert!(!err.message.contains("secret table detail"));
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let err = ApiError::unauthorized();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.kind(), "unauthorized");
    }

    #[test]
    fn error_body_serializes_with_stable_shape() {
        let body = super::ErrorBody {
            error: "not_found",
            message: "Task not found".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["error"], "not_found");
        assert_eq!(value["message"], "Task not found");
    }
}
