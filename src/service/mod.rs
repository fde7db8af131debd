//! Service layer: business logic orchestration.
//!
//! [`EventService`] implements [`EventUseCase`] on top of any
//! [`crate::persistence::EventRepository`]. It has no knowledge of HTTP.

pub mod event_service;

pub use event_service::{EventService, EventUseCase};
