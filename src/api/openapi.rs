//! OpenAPI document for the HTTP surface.
//!
//! With the `swagger-ui` feature the document is served at
//! `/api-docs/openapi.json` together with an interactive UI at `/swagger-ui`.
//! Without it only the JSON document is served.

use axum::Router;
use utoipa::OpenApi;

use crate::api::handlers::{events, system};
use crate::app_state::AppState;
use crate::domain::Event;
use crate::error::ErrorResponse;

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Generated OpenAPI document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "calendar-gateway",
        description = "Create, update, delete and list calendar events."
    ),
    paths(
        events::create_event,
        events::update_event,
        events::delete_event,
        events::events_for_day,
        events::events_for_week,
        events::events_for_month,
        system::health_handler,
    ),
    components(schemas(Event, ErrorResponse, system::HealthResponse)),
    tags(
        (name = "Events", description = "Event scheduling"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;

/// Routes serving the OpenAPI document.
#[cfg(feature = "swagger-ui")]
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()))
}

/// Routes serving the OpenAPI document.
#[cfg(not(feature = "swagger-ui"))]
pub fn routes() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/create_event",
            "/update_event",
            "/delete_event",
            "/events_for_day",
            "/events_for_week",
            "/events_for_month",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }

    fn resolve<'a>(doc: &'a Value, schema: &'a Value) -> Option<&'a Value> {
        match schema.get("$ref").and_then(Value::as_str) {
            Some(reference) => doc.pointer(reference.trim_start_matches('#')),
            None => Some(schema),
        }
    }

    #[test]
    fn success_bodies_document_the_envelope() {
        let Ok(doc) = serde_json::to_value(ApiDoc::openapi()) else {
            panic!("document serializes");
        };
        for (path, method) in [
            ("/create_event", "post"),
            ("/update_event", "post"),
            ("/delete_event", "post"),
            ("/events_for_day", "get"),
            ("/events_for_week", "get"),
            ("/events_for_month", "get"),
            ("/health", "get"),
        ] {
            let pointer = format!(
                "/paths/{}/{method}/responses/200/content/application~1json/schema",
                path.replace('/', "~1")
            );
            let Some(schema) = doc.pointer(&pointer) else {
                panic!("{path} has no 200 schema");
            };
            let envelope = resolve(&doc, schema);
            assert!(
                envelope.and_then(|e| e.pointer("/properties/result")).is_some(),
                "{path} success body is not the result envelope: {schema}"
            );
        }
    }
}
