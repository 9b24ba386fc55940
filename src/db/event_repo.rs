//! Event repository implementation for DevEvent
//!
//! PostgreSQL storage for events. Rows are written already validated and
//! normalized; uniqueness of slugs is enforced by the `events_slug_key`
//! constraint and surfaces as [`RepositoryError::Conflict`].

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    db::{
        connection::Database,
        repository::{Repository, RepositoryError, RepositoryResult},
        DbPool,
    },
    db_span,
    models::event::{Event, EventMode, NormalizedEvent},
};

const EVENT_COLUMNS: &str = "id, title, slug, description, overview, image, venue, location, \
     date, time, mode, audience, agenda, organizer, tags, created_at, updated_at";

/// Event repository trait
#[async_trait]
pub trait EventRepository: Repository {
    /// All events, most recently created first
    async fn list_newest_first(&self) -> RepositoryResult<Vec<Event>>;

    /// Find an event by its slug (exact match)
    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>>;

    /// Whether an event with the ID exists
    async fn exists(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Whether an event other than `exclude` holds the slug
    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> RepositoryResult<bool>;

    /// Events other than `exclude_id` that carry at least one of the tags
    async fn find_sharing_tags(
        &self,
        tags: &[String],
        exclude_id: Uuid,
    ) -> RepositoryResult<Vec<Event>>;

    /// Insert a new event; the store assigns the ID and timestamps
    async fn insert(&self, event: &NormalizedEvent) -> RepositoryResult<Event>;

    /// Replace every field of an existing event
    async fn update(&self, id: Uuid, event: &NormalizedEvent) -> RepositoryResult<Event>;
}

/// PostgreSQL implementation of EventRepository
pub struct PgEventRepository {
    db: Arc<Database>,
}

impl PgEventRepository {
    /// Create a new PostgreSQL event repository
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn pool(&self) -> RepositoryResult<DbPool> {
        self.db
            .ensure_connection()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))
    }

    /// Convert a database row to an Event
    fn row_to_event(row: &sqlx::postgres::PgRow) -> RepositoryResult<Event> {
        let mode_str: String = row.try_get("mode")?;
        let mode = EventMode::from_str(&mode_str)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        Ok(Event {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            slug: row.try_get("slug")?,
            description: row.try_get("description")?,
            overview: row.try_get("overview")?,
            image: row.try_get("image")?,
            venue: row.try_get("venue")?,
            location: row.try_get("location")?,
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            mode,
            audience: row.try_get("audience")?,
            agenda: row.try_get("agenda")?,
            organizer: row.try_get("organizer")?,
            tags: row.try_get("tags")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl Repository for PgEventRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        let pool = self.pool().await?;

        sqlx::query("SELECT 1")
            .fetch_one(&pool)
            .await
            .map(|_| ())
            .map_err(|e| RepositoryError::Connection(format!("Health check failed: {}", e)))
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn list_newest_first(&self) -> RepositoryResult<Vec<Event>> {
        let pool = self.pool().await?;
        let span = db_span!("list", "events");

        let rows = sqlx::query(&format!(
            "SELECT {} FROM events ORDER BY created_at DESC, id DESC",
            EVENT_COLUMNS
        ))
        .fetch_all(&pool)
        .instrument(span.clone())
        .await
        .map_err(RepositoryError::from_sqlx)?;

        span.record("rows", rows.len() as u64);
        rows.iter().map(Self::row_to_event).collect()
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>> {
        let pool = self.pool().await?;

        let row = sqlx::query(&format!("SELECT {} FROM events WHERE slug = $1", EVENT_COLUMNS))
            .bind(slug)
            .fetch_optional(&pool)
            .instrument(db_span!("find_by_slug", "events"))
            .await
            .map_err(RepositoryError::from_sqlx)?;

        row.as_ref().map(Self::row_to_event).transpose()
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        let pool = self.pool().await?;

        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(id)
            .fetch_one(&pool)
            .instrument(db_span!("exists", "events"))
            .await
            .map_err(RepositoryError::from_sqlx)
    }

    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> RepositoryResult<bool> {
        let pool = self.pool().await?;

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM events
                WHERE slug = $1 AND ($2::UUID IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(&pool)
        .instrument(db_span!("slug_in_use", "events"))
        .await
        .map_err(RepositoryError::from_sqlx)
    }

    async fn find_sharing_tags(
        &self,
        tags: &[String],
        exclude_id: Uuid,
    ) -> RepositoryResult<Vec<Event>> {
        let pool = self.pool().await?;
        let span = db_span!("find_sharing_tags", "events");

        let rows = sqlx::query(&format!(
            "SELECT {} FROM events WHERE id <> $1 AND tags && $2",
            EVENT_COLUMNS
        ))
        .bind(exclude_id)
        .bind(tags)
        .fetch_all(&pool)
        .instrument(span.clone())
        .await
        .map_err(RepositoryError::from_sqlx)?;

        span.record("rows", rows.len() as u64);
        rows.iter().map(Self::row_to_event).collect()
    }

    async fn insert(&self, event: &NormalizedEvent) -> RepositoryResult<Event> {
        let pool = self.pool().await?;
        let now = Utc::now();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO events (
                id, title, slug, description, overview, image, venue, location,
                date, time, mode, audience, agenda, organizer, tags, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.mode.as_str())
        .bind(&event.audience)
        .bind(&event.agenda)
        .bind(&event.organizer)
        .bind(&event.tags)
        .bind(now)
        .fetch_one(&pool)
        .instrument(db_span!("insert", "events"))
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Self::row_to_event(&row)
    }

    async fn update(&self, id: Uuid, event: &NormalizedEvent) -> RepositoryResult<Event> {
        let pool = self.pool().await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE events SET
                title = $2, slug = $3, description = $4, overview = $5, image = $6,
                venue = $7, location = $8, date = $9, time = $10, mode = $11,
                audience = $12, agenda = $13, organizer = $14, tags = $15,
                updated_at = $16
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        ))
        .bind(id)
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.description)
        .bind(&event.overview)
        .bind(&event.image)
        .bind(&event.venue)
        .bind(&event.location)
        .bind(&event.date)
        .bind(&event.time)
        .bind(event.mode.as_str())
        .bind(&event.audience)
        .bind(&event.agenda)
        .bind(&event.organizer)
        .bind(&event.tags)
        .bind(Utc::now())
        .fetch_optional(&pool)
        .instrument(db_span!("update", "events"))
        .await
        .map_err(RepositoryError::from_sqlx)?;

        match row {
            Some(row) => Self::row_to_event(&row),
            None => Err(RepositoryError::NotFound(format!("event {}", id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_columns_cover_every_field() {
        let columns: Vec<_> = EVENT_COLUMNS.split(',').map(str::trim).collect();
        assert_eq!(columns.len(), 17);
        for expected in ["id", "slug", "agenda", "tags", "created_at", "updated_at"] {
            assert!(columns.contains(&expected), "missing {}", expected);
        }
    }
}
