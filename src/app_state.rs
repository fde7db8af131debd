//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::EventUseCase;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event use cases.
    pub events: Arc<dyn EventUseCase>,
}

impl AppState {
    /// Creates state around the given use-case implementation.
    #[must_use]
    pub fn new(events: Arc<dyn EventUseCase>) -> Self {
        Self { events }
    }
}
