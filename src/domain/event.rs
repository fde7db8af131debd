//! Calendar event entity and the partial update applied to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length of [`Event::content`], in characters.
pub const MAX_CONTENT_LEN: usize = 128;

/// A user-owned, dated record with free-text content.
///
/// `event_id` is assigned by the repository. It is `0` on an event that has
/// not been stored yet and non-zero on every event a repository returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Owning user.
    pub user_id: i64,
    /// Store-assigned identifier (`0` until stored).
    pub event_id: i64,
    /// Midnight UTC of the event's calendar day.
    pub date: DateTime<Utc>,
    /// Free-text description.
    #[serde(default)]
    pub content: String,
}

impl Event {
    /// Creates an event that has not been stored yet.
    #[must_use]
    pub fn new(user_id: i64, date: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            user_id,
            event_id: 0,
            date,
            content: content.into(),
        }
    }
}

/// Partial update of a stored [`Event`].
///
/// Only the fields that are `Some` are written; the rest keep their stored
/// value. The target identifier is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Event to update.
    pub event_id: i64,
    /// New owner, if changed.
    pub user_id: Option<i64>,
    /// New date, if changed.
    pub date: Option<DateTime<Utc>>,
    /// New content, if changed.
    pub content: Option<String>,
}

impl ChangeSet {
    /// Creates an empty change-set targeting `event_id`.
    #[must_use]
    pub const fn new(event_id: i64) -> Self {
        Self {
            event_id,
            user_id: None,
            date: None,
            content: None,
        }
    }

    /// Writes the present fields into `event`.
    pub fn apply(&self, event: &mut Event) {
        if let Some(user_id) = self.user_id {
            event.user_id = user_id;
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(content) = &self.content {
            event.content.clone_from(content);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn may_first() -> DateTime<Utc> {
        let Some(date) = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single() else {
            panic!("valid date");
        };
        date
    }

    #[test]
    fn new_event_is_not_stored() {
        let event = Event::new(3, may_first(), "standup");
        assert_eq!(event.event_id, 0);
    }

    #[test]
    fn serializes_in_wire_field_order() {
        let mut event = Event::new(3, may_first(), "standup");
        event.event_id = 1;
        let json = serde_json::to_string(&event).ok();
        assert_eq!(
            json.as_deref(),
            Some(r#"{"user_id":3,"event_id":1,"date":"2024-05-01T00:00:00Z","content":"standup"}"#)
        );
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut event = Event::new(3, may_first(), "standup");
        event.event_id = 1;

        let mut changes = ChangeSet::new(1);
        changes.content = Some("standup moved".to_string());
        changes.apply(&mut event);

        assert_eq!(event.user_id, 3);
        assert_eq!(event.date, may_first());
        assert_eq!(event.content, "standup moved");
    }

    #[test]
    fn empty_change_set_is_a_no_op() {
        let mut event = Event::new(9, may_first(), "retro");
        let before = event.clone();
        let changes = ChangeSet::new(1);
        changes.apply(&mut event);
        assert_eq!(event, before);
    }
}
