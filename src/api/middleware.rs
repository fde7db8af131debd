//! Cross-cutting request handling: request log, panics, timeouts.

use std::any::Any;
use std::time::Instant;

use axum::BoxError;
use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::{ApiError, ErrorMessage};

/// Response header carrying the per-request identifier.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Logs one line per completed request.
///
/// Successful requests log at `info`, client errors at `warn` and server
/// errors at `error`, with the rendered error message when there is one.
/// Every response gets an `x-request-id` header.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let mut response = next.run(req).await;

    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    let status = response.status();
    let error = response
        .extensions()
        .get::<ErrorMessage>()
        .map(|ErrorMessage(message)| message.as_str());

    if status.is_server_error() {
        tracing::error!(%request_id, %method, %uri, status = status.as_u16(), latency_ms, error, "request failed");
    } else if status.is_client_error() {
        tracing::warn!(%request_id, %method, %uri, status = status.as_u16(), latency_ms, error, "request rejected");
    } else {
        tracing::info!(%request_id, %method, %uri, status = status.as_u16(), latency_ms, "request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Renders a handler panic as `500 {"error": "Internal server error"}`.
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(panic = %detail, "handler panicked");
    ApiError::Internal("Internal server error".to_string()).into_response()
}

/// Renders errors from the timeout layer.
pub async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(format!("Unhandled internal error: {err}"))
    }
}
