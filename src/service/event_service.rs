//! Event use cases: create, update, delete and list.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ChangeSet, Event, StoreError};
use crate::persistence::EventRepository;

/// Business operations on events, as seen by the transport layer.
#[async_trait]
pub trait EventUseCase: Send + Sync + Debug {
    /// Stores a validated, not yet stored event and returns it with its id.
    ///
    /// # Errors
    ///
    /// Propagates the repository's [`StoreError`].
    async fn create(&self, event: Event) -> Result<Event, StoreError>;

    /// Applies a partial update and returns the merged event.
    ///
    /// # Errors
    ///
    /// Propagates the repository's [`StoreError`], including
    /// [`StoreError::NotFound`].
    async fn update(&self, changes: ChangeSet) -> Result<Event, StoreError>;

    /// Deletes an event by identifier.
    ///
    /// # Errors
    ///
    /// Propagates the repository's [`StoreError`], including
    /// [`StoreError::NotFound`].
    async fn delete(&self, event_id: i64) -> Result<(), StoreError>;

    /// Lists a user's events in the window `[today, today + period)`.
    ///
    /// # Errors
    ///
    /// Propagates the repository's [`StoreError`].
    async fn events_for(&self, user_id: i64, period: Duration) -> Result<Vec<Event>, StoreError>;
}

/// Orchestration layer over an [`EventRepository`].
///
/// Stateless: every call forwards to the repository and returns its error
/// unchanged. No retries.
#[derive(Debug, Clone)]
pub struct EventService {
    repo: Arc<dyn EventRepository>,
}

impl EventService {
    /// Creates a service backed by `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn EventRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl EventUseCase for EventService {
    async fn create(&self, event: Event) -> Result<Event, StoreError> {
        let event = self.repo.store(event).await?;
        tracing::info!(event_id = event.event_id, user_id = event.user_id, "event created");
        Ok(event)
    }

    async fn update(&self, changes: ChangeSet) -> Result<Event, StoreError> {
        let event = self.repo.modify(changes).await?;
        tracing::info!(event_id = event.event_id, "event updated");
        Ok(event)
    }

    async fn delete(&self, event_id: i64) -> Result<(), StoreError> {
        self.repo.delete(event_id).await?;
        tracing::info!(event_id, "event deleted");
        Ok(())
    }

    async fn events_for(&self, user_id: i64, period: Duration) -> Result<Vec<Event>, StoreError> {
        self.repo.events_for(user_id, period).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::{EventWindow, InMemoryEventRepository};

    const DAY: Duration = Duration::from_secs(86_400);

    /// Repository whose every call fails with a store fault.
    #[derive(Debug)]
    struct BrokenRepository;

    #[async_trait]
    impl EventRepository for BrokenRepository {
        async fn store(&self, _event: Event) -> Result<Event, StoreError> {
            Err(StoreError::Persistence("disk full".to_string()))
        }

        async fn modify(&self, _changes: ChangeSet) -> Result<Event, StoreError> {
            Err(StoreError::Persistence("disk full".to_string()))
        }

        async fn delete(&self, _event_id: i64) -> Result<(), StoreError> {
            Err(StoreError::Persistence("disk full".to_string()))
        }

        async fn events_for(&self, _user_id: i64, _period: Duration) -> Result<Vec<Event>, StoreError> {
            Err(StoreError::Persistence("disk full".to_string()))
        }
    }

    fn make_service() -> EventService {
        EventService::new(Arc::new(InMemoryEventRepository::new()))
    }

    fn today() -> chrono::DateTime<chrono::Utc> {
        EventWindow::starting_today(DAY).start
    }

    #[tokio::test]
    async fn create_then_list() {
        let service = make_service();
        let Ok(created) = service.create(Event::new(7, today(), "standup")).await else {
            panic!("create failed");
        };
        assert_ne!(created.event_id, 0);

        let Ok(events) = service.events_for(7, DAY).await else {
            panic!("list failed");
        };
        assert_eq!(events, vec![created]);
    }

    #[tokio::test]
    async fn not_found_is_forwarded_unchanged() {
        let service = make_service();
        assert!(matches!(
            service.delete(3).await,
            Err(StoreError::NotFound { event_id: 3 })
        ));
        assert!(matches!(
            service.update(ChangeSet::new(3)).await,
            Err(StoreError::NotFound { event_id: 3 })
        ));
    }

    #[tokio::test]
    async fn persistence_faults_are_forwarded_unchanged() {
        let service = EventService::new(Arc::new(BrokenRepository));
        let err = service.create(Event::new(1, today(), "x")).await;
        assert!(matches!(err, Err(StoreError::Persistence(ref msg)) if msg == "disk full"));
        assert!(matches!(
            service.events_for(1, DAY).await,
            Err(StoreError::Persistence(_))
        ));
    }
}
