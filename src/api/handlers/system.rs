//! System endpoints: health check.

use axum::Router;
use axum::routing::get;
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::ApiResponse;

/// Health check payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the server answers.
    pub status: String,
    /// Current time, RFC 3339.
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// `GET /health`: service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp in `result`.",
    responses(
        (status = 200, description = "Service is healthy", body = ApiResponse<HealthResponse>),
    )
)]
pub async fn health_handler() -> ApiResponse<HealthResponse> {
    ApiResponse::new(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// System routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
