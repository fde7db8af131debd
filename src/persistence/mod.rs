//! Persistence layer: the [`EventRepository`] contract and its stores.
//!
//! The service layer only sees `Arc<dyn EventRepository>`, so the storage
//! engine can be swapped without touching request handling. Two stores are
//! provided: [`InMemoryEventRepository`] and [`SqliteEventRepository`]
//! (`sqlx::SqlitePool`).

pub mod memory;
pub mod sqlite;

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{ChangeSet, Event, StoreError};

pub use memory::InMemoryEventRepository;
pub use sqlite::SqliteEventRepository;

/// Durable storage of [`Event`]s.
///
/// Implementations are shared by every in-flight request and must handle
/// their own synchronization. Updates are last-writer-wins.
#[async_trait]
pub trait EventRepository: Send + Sync + Debug {
    /// Stores a new event and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] on any store fault.
    async fn store(&self, event: Event) -> Result<Event, StoreError>;

    /// Applies `changes` to the stored event (read, merge, write) and
    /// returns the merged event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no event has the target
    /// identifier, [`StoreError::Persistence`] on a store fault.
    async fn modify(&self, changes: ChangeSet) -> Result<Event, StoreError>;

    /// Deletes the event with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if nothing was deleted,
    /// [`StoreError::Persistence`] on a store fault.
    async fn delete(&self, event_id: i64) -> Result<(), StoreError>;

    /// Returns the user's events dated within `[today, today + period)`,
    /// ordered by date then identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] on a store fault.
    async fn events_for(&self, user_id: i64, period: Duration) -> Result<Vec<Event>, StoreError>;
}

/// Half-open date range `[start, end)` used by listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
}

impl EventWindow {
    /// Window of length `period` starting at the current UTC day.
    #[must_use]
    pub fn starting_today(period: Duration) -> Self {
        Self::starting_at(Utc::now(), period)
    }

    /// Window of length `period` starting at midnight of `now`'s UTC day.
    #[must_use]
    pub fn starting_at(now: DateTime<Utc>, period: Duration) -> Self {
        let start = Utc.from_utc_datetime(&now.date_naive().and_time(chrono::NaiveTime::default()));
        let end = chrono::Duration::from_std(period)
            .ok()
            .and_then(|period| start.checked_add_signed(period))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    /// Returns `true` if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start <= date && date < self.end
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        let Some(date) = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single() else {
            panic!("valid date");
        };
        date
    }

    #[test]
    fn window_starts_at_midnight() {
        let window = EventWindow::starting_at(at(2024, 5, 1, 15), Duration::from_secs(86_400));
        assert_eq!(window.start, at(2024, 5, 1, 0));
        assert_eq!(window.end, at(2024, 5, 2, 0));
    }

    #[test]
    fn window_is_half_open() {
        let window = EventWindow::starting_at(at(2024, 5, 1, 9), Duration::from_secs(7 * 86_400));
        assert!(window.contains(at(2024, 5, 1, 0)));
        assert!(window.contains(at(2024, 5, 7, 0)));
        assert!(!window.contains(at(2024, 5, 8, 0)));
        assert!(!window.contains(at(2024, 4, 30, 0)));
    }
}
