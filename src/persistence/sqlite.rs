//! SQLite implementation of [`EventRepository`].
//!
//! Dates are stored as unix seconds so window queries compare integers.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::{EventRepository, EventWindow};
use crate::domain::{ChangeSet, Event, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS events (
    event_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id  INTEGER NOT NULL,
    date     INTEGER NOT NULL,
    content  VARCHAR(128) NOT NULL
)";

type EventRow = (i64, i64, i64, String);

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// SQLite-backed event store using `sqlx::SqlitePool`.
#[derive(Debug, Clone)]
pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    /// Wraps an existing pool and creates the `events` table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the schema cannot be created.
    pub async fn new(pool: SqlitePool) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    /// Opens a pool for `database_url` and prepares the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] if the database cannot be opened
    /// or the schema cannot be created.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await?;
        tracing::info!(database_url, "sqlite event store opened");
        Self::new(pool).await
    }
}

fn from_row((event_id, user_id, date, content): EventRow) -> Result<Event, StoreError> {
    let date = DateTime::<Utc>::from_timestamp(date, 0).ok_or_else(|| {
        StoreError::Persistence(format!("event {event_id} has an out-of-range date: {date}"))
    })?;
    Ok(Event {
        user_id,
        event_id,
        date,
        content,
    })
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn store(&self, mut event: Event) -> Result<Event, StoreError> {
        let event_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (user_id, date, content) VALUES (?, ?, ?) RETURNING event_id",
        )
        .bind(event.user_id)
        .bind(event.date.timestamp())
        .bind(&event.content)
        .fetch_one(&self.pool)
        .await?;

        event.event_id = event_id;
        Ok(event)
    }

    async fn modify(&self, changes: ChangeSet) -> Result<Event, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, EventRow>(
            "SELECT event_id, user_id, date, content FROM events WHERE event_id = ?",
        )
        .bind(changes.event_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound {
            event_id: changes.event_id,
        })?;

        let mut event = from_row(row)?;
        changes.apply(&mut event);

        sqlx::query("UPDATE events SET user_id = ?, date = ?, content = ? WHERE event_id = ?")
            .bind(event.user_id)
            .bind(event.date.timestamp())
            .bind(&event.content)
            .bind(event.event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(event)
    }

    async fn delete(&self, event_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE event_id = ?")
            .bind(event_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { event_id });
        }
        Ok(())
    }

    async fn events_for(&self, user_id: i64, period: Duration) -> Result<Vec<Event>, StoreError> {
        let window = EventWindow::starting_today(period);

        let rows = sqlx::query_as::<_, EventRow>(
            "SELECT event_id, user_id, date, content FROM events \
             WHERE user_id = ? AND date >= ? AND date < ? \
             ORDER BY date ASC, event_id ASC",
        )
        .bind(user_id)
        .bind(window.start.timestamp())
        .bind(window.end.timestamp())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(from_row).collect()
    }
}
