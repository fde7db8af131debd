//! Domain layer: the event model, request fields, operations and validation.
//!
//! Nothing in here knows about HTTP. The transport layer decodes requests
//! into [`Fields`], and [`validation`] turns those into typed [`Event`] and
//! [`ChangeSet`] values or a [`ValidationError`].

pub mod error;
pub mod event;
pub mod field;
pub mod operation;
pub mod validation;

pub use error::{StoreError, ValidationError};
pub use event::{ChangeSet, Event};
pub use field::{FieldValue, Fields};
pub use operation::Operation;
pub use validation::{validate, validate_changes};
