//! # calendar-gateway
//!
//! HTTP service for creating, updating, deleting and listing calendar
//! events.
//!
//! Business logic knows nothing about HTTP: handlers decode requests into
//! untyped fields, the validator turns them into typed domain values, and
//! the service forwards to a swappable repository. Every response is either
//! `{"result": ...}` or `{"error": "..."}`.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── HttpServer (server)       bind, serve, notify, drain
//!     ├── REST Handlers (api/)      decode, route, render envelope
//!     │
//!     ├── Validation (domain/)      Fields -> Event / ChangeSet
//!     ├── EventService (service/)   use cases
//!     │
//!     └── EventRepository (persistence/)
//!           ├── SQLite (sqlx)
//!           └── in-memory
//! ```

pub mod api;
pub mod app;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod server;
pub mod service;
