//! In-process event store.
//!
//! [`InMemoryEventRepository`] keeps every event in a `BTreeMap` behind a
//! [`tokio::sync::RwLock`]. Reads run concurrently, writes are serialized.
//! Identifiers start at 1 and are never reused.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EventRepository, EventWindow};
use crate::domain::{ChangeSet, Event, StoreError};

#[derive(Debug, Default)]
struct Inner {
    events: BTreeMap<i64, Event>,
    last_id: i64,
}

/// Event store held entirely in memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    inner: RwLock<Inner>,
}

impl InMemoryEventRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn store(&self, mut event: Event) -> Result<Event, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id = inner
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::Persistence("event identifiers exhausted".to_string()))?;
        event.event_id = inner.last_id;
        inner.events.insert(event.event_id, event.clone());
        Ok(event)
    }

    async fn modify(&self, changes: ChangeSet) -> Result<Event, StoreError> {
        let mut inner = self.inner.write().await;
        let event = inner
            .events
            .get_mut(&changes.event_id)
            .ok_or(StoreError::NotFound {
                event_id: changes.event_id,
            })?;
        changes.apply(event);
        Ok(event.clone())
    }

    async fn delete(&self, event_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .events
            .remove(&event_id)
            .map(|_| ())
            .ok_or(StoreError::NotFound { event_id })
    }

    async fn events_for(&self, user_id: i64, period: Duration) -> Result<Vec<Event>, StoreError> {
        let window = EventWindow::starting_today(period);
        let inner = self.inner.read().await;
        let mut events: Vec<Event> = inner
            .events
            .values()
            .filter(|e| e.user_id == user_id && window.contains(e.date))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.date, e.event_id));
        Ok(events)
    }
}
