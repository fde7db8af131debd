//! Domain error types.
//!
//! These errors carry no transport knowledge. The HTTP status each one maps
//! to is decided in [`crate::error::ApiError`].

/// A request could not be turned into a typed [`super::Event`] or
/// [`super::ChangeSet`].
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A field required by the requested operation is absent.
    #[error("Required field missed: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The `date` field is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date format: {raw:?}: {reason}")]
    InvalidDate {
        /// The value as received.
        raw: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A numeric field holds text that is not a number.
    #[error("Invalid number in field {field}: {raw:?}")]
    InvalidNumber {
        /// Name of the offending field.
        field: String,
        /// The value as received.
        raw: String,
    },

    /// A field holds a value kind the wire format does not allow
    /// (`null`, booleans, arrays, objects).
    #[error("Unsupported value in field {field}")]
    UnsupportedValue {
        /// Name of the offending field.
        field: String,
    },

    /// The `content` field exceeds the storable length.
    #[error("Content too long: {len} characters (max {max})")]
    ContentTooLong {
        /// Length of the submitted content, in characters.
        len: usize,
        /// Maximum accepted length, in characters.
        max: usize,
    },
}

/// Failure reported by an [`crate::persistence::EventRepository`].
///
/// `NotFound` is kept apart from `Persistence` so callers can tell a missing
/// record from a store fault.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No event with the given identifier exists.
    #[error("Event does not exist, event_id = {event_id}")]
    NotFound {
        /// The identifier that was looked up.
        event_id: i64,
    },

    /// The underlying store failed.
    #[error("persistence error: {0}")]
    Persistence(String),
}

