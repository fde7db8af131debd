//! REST API layer: request decoding, route handlers, and router composition.
//!
//! Endpoints are mounted at the root: `/create_event`, `/update_event`,
//! `/delete_event`, `/events_for_day`, `/events_for_week`,
//! `/events_for_month` and `/health`.

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::error::ApiError;

/// Builds the complete API router with all REST endpoints.
///
/// Unknown paths answer `404 {"error": "Not found"}`.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(handlers::routes())
        .merge(openapi::routes())
        .fallback(route_not_found)
}

/// Builds the servable application: the router plus the middleware stack,
/// bound to `state`.
///
/// From the outside in: HTTP tracing, the request log, the per-request
/// timeout, and panic recovery.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    build_router()
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(middleware::handle_timeout))
                .timeout(request_timeout),
        )
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
