//! The operations the service offers and their per-operation rules.

use std::fmt;
use std::time::Duration;

const DAY_SECS: u64 = 24 * 60 * 60;

/// A request the service can handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Store a new event.
    Create,
    /// Partially update a stored event.
    Update,
    /// Remove a stored event.
    Delete,
    /// List a user's events for the next day.
    EventsForDay,
    /// List a user's events for the next week.
    EventsForWeek,
    /// List a user's events for the next "month".
    EventsForMonth,
}

impl Operation {
    /// Every operation, in routing order.
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Update,
        Self::Delete,
        Self::EventsForDay,
        Self::EventsForWeek,
        Self::EventsForMonth,
    ];

    /// Fields that must be present for this operation.
    #[must_use]
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Create => &["user_id", "date"],
            Self::Update | Self::Delete => &["event_id"],
            Self::EventsForDay | Self::EventsForWeek | Self::EventsForMonth => &["user_id"],
        }
    }

    /// Listing window for query operations, `None` for mutations.
    ///
    /// The month window is 30 weeks of 24-hour days, not a calendar month.
    #[must_use]
    pub const fn period(self) -> Option<Duration> {
        match self {
            Self::EventsForDay => Some(Duration::from_secs(DAY_SECS)),
            Self::EventsForWeek => Some(Duration::from_secs(7 * DAY_SECS)),
            Self::EventsForMonth => Some(Duration::from_secs(30 * 7 * DAY_SECS)),
            Self::Create | Self::Update | Self::Delete => None,
        }
    }

    /// Returns `true` for operations that change stored state.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        self.period().is_none()
    }

    /// Stable snake_case name, also used as the route name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create_event",
            Self::Update => "update_event",
            Self::Delete => "delete_event",
            Self::EventsForDay => "events_for_day",
            Self::EventsForWeek => "events_for_week",
            Self::EventsForMonth => "events_for_month",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
