//! API error type with HTTP status code mapping, and the response envelope.
//!
//! Every response body is exactly one of:
//!
//! ```json
//! {"result": <payload>}
//! {"error": "<message>"}
//! ```
//!
//! [`ApiResponse`] renders the first, [`ErrorResponse`] the second.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{StoreError, ValidationError};

/// Successful response body: `{"result": <payload>}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Operation payload.
    pub result: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps `result` in the success envelope.
    pub const fn new(result: T) -> Self {
        Self { result }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Error response body: `{"error": "<message>"}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Error message attached to error responses as an extension, so the request
/// logger can report it without buffering the body.
#[derive(Debug, Clone)]
pub struct ErrorMessage(pub String);

/// Request-level failure with HTTP status code mapping.
///
/// | Variant            | HTTP status |
/// |--------------------|-------------|
/// | `Decode`           | 400         |
/// | `Validation`       | 400         |
/// | `RouteNotFound`    | 404         |
/// | `MethodNotAllowed` | 405         |
/// | `Timeout`          | 500         |
/// | `Internal`         | 500         |
/// | `Business`         | 503         |
///
/// A missing event is a business failure and answers `503`, like any other
/// store error.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body or query string could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// Decoded fields failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The route exists but not for this HTTP method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No route matches the request path.
    #[error("Not found")]
    RouteNotFound,

    /// The request did not complete within the configured budget. The
    /// abandoned handler may already have committed its write.
    #[error("Request timed out")]
    Timeout,

    /// The use case failed (missing event, store fault).
    #[error(transparent)]
    Business(#[from] StoreError),

    /// Unexpected internal fault.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Business(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status_code(), self.to_string())
    }
}

/// Renders `{"error": message}` with `status`.
fn error_response(status: StatusCode, message: String) -> Response {
    let mut response = (
        status,
        Json(ErrorResponse {
            error: message.clone(),
        }),
    )
        .into_response();
    response.extensions_mut().insert(ErrorMessage(message));
    response
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), 10_000).await else {
            panic!("readable body");
        };
        let Ok(value) = serde_json::from_slice(&bytes) else {
            panic!("json body");
        };
        value
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation(ValidationError::MissingField { field: "user_id" }).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Decode("eof".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MethodNotAllowed.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            ApiError::Business(StoreError::Persistence("io".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::Internal("boom".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Timeout.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    // Not-found answers 503 rather than 404: it is reported as a business
    // failure like every other store error.
    #[test]
    fn missing_event_is_service_unavailable() {
        let err = ApiError::from(StoreError::NotFound { event_id: 9 });
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "Event does not exist, event_id = 9");
    }

    #[tokio::test]
    async fn error_envelope_has_only_error_key() {
        let response = ApiError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.extensions().get::<ErrorMessage>().is_some());
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"error": "Method not allowed"})
        );
    }

    #[tokio::test]
    async fn success_envelope_has_only_result_key() {
        let response = ApiResponse::new(vec![1, 2]).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"result": [1, 2]}));
    }
}
