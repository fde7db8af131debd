//! Event endpoints: create, update, delete and the three listing windows.
//!
//! Each handler decodes the request into fields, validates them for its
//! [`Operation`], calls the [`crate::service::EventUseCase`] and renders the
//! envelope. Routing is driven by [`Operation::ALL`]: mutations answer
//! `POST`, listings answer `GET`, any other method gets `405`.

use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::routing::{MethodFilter, MethodRouter, on};

use crate::api::extract::RequestFields;
use crate::app_state::AppState;
use crate::domain::{Event, Fields, Operation, validate, validate_changes};
use crate::error::{ApiError, ApiResponse, ErrorResponse};

/// `POST /create_event`: stores a new event.
///
/// # Errors
///
/// Returns [`ApiError`] on undecodable input, failed validation or a store
/// failure.
#[utoipa::path(
    post,
    path = "/create_event",
    tag = "Events",
    summary = "Create an event",
    description = "Requires `user_id` and `date` (`YYYY-MM-DD`); `content` is optional. Accepts a JSON object or a form-encoded body. Answers `{\"result\": Event}`.",
    request_body(content = serde_json::Value, description = "Event fields"),
    responses(
        (status = 200, description = "Created event in `result`", body = ApiResponse<Event>),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 503, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    RequestFields(fields): RequestFields,
) -> Result<ApiResponse<Event>, ApiError> {
    let event = validate(Operation::Create, &fields)?;
    let event = state.events.create(event).await?;
    Ok(ApiResponse::new(event))
}

/// `POST /update_event`: partially updates a stored event.
///
/// # Errors
///
/// Returns [`ApiError`] on undecodable input, failed validation, a missing
/// event or a store failure.
#[utoipa::path(
    post,
    path = "/update_event",
    tag = "Events",
    summary = "Update an event",
    description = "Requires `event_id`; `user_id`, `date` and `content` are changed only when present. Answers `{\"result\": Event}` with the merged event.",
    request_body(content = serde_json::Value, description = "Target identifier and changed fields"),
    responses(
        (status = 200, description = "Merged event in `result`", body = ApiResponse<Event>),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 503, description = "Event not found or store failure", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    RequestFields(fields): RequestFields,
) -> Result<ApiResponse<Event>, ApiError> {
    let changes = validate_changes(&fields)?;
    let event = state.events.update(changes).await?;
    Ok(ApiResponse::new(event))
}

/// `POST /delete_event`: deletes a stored event.
///
/// # Errors
///
/// Returns [`ApiError`] on undecodable input, failed validation, a missing
/// event or a store failure.
#[utoipa::path(
    post,
    path = "/delete_event",
    tag = "Events",
    summary = "Delete an event",
    description = "Requires `event_id`. Answers `{\"result\": \"event event_id = <id> deleted\"}`.",
    request_body(content = serde_json::Value, description = "Target identifier"),
    responses(
        (status = 200, description = "Confirmation message in `result`", body = ApiResponse<String>),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 503, description = "Event not found or store failure", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    RequestFields(fields): RequestFields,
) -> Result<ApiResponse<String>, ApiError> {
    let target = validate(Operation::Delete, &fields)?;
    state.events.delete(target.event_id).await?;
    Ok(ApiResponse::new(format!(
        "event event_id = {} deleted",
        target.event_id
    )))
}

/// `GET /events_for_day`: the user's events from today for 24 hours.
///
/// # Errors
///
/// Returns [`ApiError`] on a missing or invalid `user_id`, or a store failure.
#[utoipa::path(
    get,
    path = "/events_for_day",
    tag = "Events",
    summary = "List today's events",
    params(("user_id" = i64, Query, description = "Owning user")),
    responses(
        (status = 200, description = "Events in `result`", body = ApiResponse<Vec<Event>>),
        (status = 400, description = "Missing or invalid user_id", body = ErrorResponse),
        (status = 503, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn events_for_day(
    State(state): State<AppState>,
    RequestFields(fields): RequestFields,
) -> Result<ApiResponse<Vec<Event>>, ApiError> {
    list_events(&state, Operation::EventsForDay, &fields).await
}

/// `GET /events_for_week`: the user's events from today for 7 days.
///
/// # Errors
///
/// Returns [`ApiError`] on a missing or invalid `user_id`, or a store failure.
#[utoipa::path(
    get,
    path = "/events_for_week",
    tag = "Events",
    summary = "List this week's events",
    params(("user_id" = i64, Query, description = "Owning user")),
    responses(
        (status = 200, description = "Events in `result`", body = ApiResponse<Vec<Event>>),
        (status = 400, description = "Missing or invalid user_id", body = ErrorResponse),
        (status = 503, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn events_for_week(
    State(state): State<AppState>,
    RequestFields(fields): RequestFields,
) -> Result<ApiResponse<Vec<Event>>, ApiError> {
    list_events(&state, Operation::EventsForWeek, &fields).await
}

/// `GET /events_for_month`: the user's events from today for 30 weeks.
///
/// # Errors
///
/// Returns [`ApiError`] on a missing or invalid `user_id`, or a store failure.
#[utoipa::path(
    get,
    path = "/events_for_month",
    tag = "Events",
    summary = "List this month's events",
    description = "The window is a fixed 30 x 7 days, not a calendar month.",
    params(("user_id" = i64, Query, description = "Owning user")),
    responses(
        (status = 200, description = "Events in `result`", body = ApiResponse<Vec<Event>>),
        (status = 400, description = "Missing or invalid user_id", body = ErrorResponse),
        (status = 503, description = "Store failure", body = ErrorResponse),
    )
)]
pub async fn events_for_month(
    State(state): State<AppState>,
    RequestFields(fields): RequestFields,
) -> Result<ApiResponse<Vec<Event>>, ApiError> {
    list_events(&state, Operation::EventsForMonth, &fields).await
}

async fn list_events(
    state: &AppState,
    operation: Operation,
    fields: &Fields,
) -> Result<ApiResponse<Vec<Event>>, ApiError> {
    let period = operation
        .period()
        .ok_or_else(|| ApiError::Internal(format!("{operation} is not a listing operation")))?;
    let query = validate(operation, fields)?;
    let events = state.events.events_for(query.user_id, period).await?;
    Ok(ApiResponse::new(events))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// HTTP method an operation is served on.
#[must_use]
pub fn method(operation: Operation) -> Method {
    if operation.is_mutation() {
        Method::POST
    } else {
        Method::GET
    }
}

/// Request path an operation is served on.
#[must_use]
pub fn path(operation: Operation) -> String {
    format!("/{}", operation.name())
}

fn method_router(operation: Operation) -> MethodRouter<AppState> {
    let filter = if method(operation) == Method::POST {
        MethodFilter::POST
    } else {
        MethodFilter::GET
    };
    let router = match operation {
        Operation::Create => on(filter, create_event),
        Operation::Update => on(filter, update_event),
        Operation::Delete => on(filter, delete_event),
        Operation::EventsForDay => on(filter, events_for_day),
        Operation::EventsForWeek => on(filter, events_for_week),
        Operation::EventsForMonth => on(filter, events_for_month),
    };
    router.fallback(method_not_allowed)
}

/// Event routes, one per [`Operation`].
pub fn routes() -> Router<AppState> {
    Operation::ALL
        .into_iter()
        .fold(Router::new(), |router, operation| {
            router.route(&path(operation), method_router(operation))
        })
}
