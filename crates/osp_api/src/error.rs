//! Mapping from domain failures to HTTP responses.

use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use osp_core::validation::ValidationError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] osp_core::Error),

    /// The transport could not decode the request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("rate limit exceeded")]
    RateLimited,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<ValidationError>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        use osp_core::Error;

        match self {
            Self::Domain(Error::Validation(_)) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Domain(Error::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Domain(Error::Conflict(_)) => StatusCode::CONFLICT,
            Self::Domain(Error::Unauthorized) => StatusCode::UNAUTHORIZED,
            Self::Domain(Error::Storage(_) | Error::Database(_) | Error::Internal(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use osp_core::Error;

        let status = self.status_code();
        let (message, details) = match self {
            Self::Domain(Error::Validation(errors)) => {
                let message = errors
                    .first()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "validation failed".to_string());
                (message, errors)
            }
            Self::Domain(Error::NotFound(msg)) => (msg, Vec::new()),
            Self::Domain(Error::Conflict(kind)) => (kind.to_string(), Vec::new()),
            Self::Domain(Error::Unauthorized) => ("invalid or missing token".to_string(), Vec::new()),
            Self::Domain(e @ (Error::Storage(_) | Error::Database(_) | Error::Internal(_))) => {
                // Details stay in the log, never in the body
                tracing::error!(error = %e, "request failed");
                ("internal server error".to_string(), Vec::new())
            }
            Self::BadRequest(msg) => (msg, Vec::new()),
            Self::RateLimited => ("too many requests, try again later".to_string(), Vec::new()),
        };

        let body = ErrorBody {
            error: message,
            details,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osp_core::{ConflictKind, Error};

    #[test]
    fn status_codes_follow_the_error_kind() {
        let cases = [
            (ApiError::from(Error::invalid("OSP-002", "phone", "bad")), StatusCode::BAD_REQUEST),
            (ApiError::from(Error::NotFound("x".into())), StatusCode::NOT_FOUND),
            (ApiError::from(Error::Conflict(ConflictKind::Utr)), StatusCode::CONFLICT),
            (ApiError::from(Error::Unauthorized), StatusCode::UNAUTHORIZED),
            (ApiError::from(Error::Storage("s3".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::from(Error::Database("pg".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{:?}", err);
        }
    }

    #[tokio::test]
    async fn internal_details_are_not_exposed() {
        let response =
            ApiError::from(Error::Database("password=hunter2 at db:5432".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("hunter2"));
        assert!(body.contains("internal server error"));
    }

    #[tokio::test]
    async fn validation_errors_carry_every_field() {
        let response = ApiError::from(Error::Validation(vec![
            ValidationError::new("OSP-001", "fullName", "full name is required"),
            ValidationError::new("OSP-002", "phone", "phone must be exactly 10 digits"),
        ]))
        .into_response();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "full name is required");
        assert_eq!(json["details"][1]["field"], "phone");
    }
}
