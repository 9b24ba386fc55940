//! Booking repository implementation for DevEvent

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
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
    models::booking::{Booking, NewBooking},
};

/// Booking repository trait
///
/// Inserts fail with [`RepositoryError::Conflict`] on
/// `bookings_event_id_email_key` when the address already holds a seat, and
/// with [`RepositoryError::MissingReference`] on `bookings_event_id_fkey` when
/// the event does not exist.
#[async_trait]
pub trait BookingRepository: Repository {
    /// Insert a booking; the store assigns the ID and timestamps
    async fn insert(&self, booking: &NewBooking) -> RepositoryResult<Booking>;

    /// Number of bookings for an event
    async fn count_for_event(&self, event_id: Uuid) -> RepositoryResult<i64>;
}

/// PostgreSQL implementation of BookingRepository
pub struct PgBookingRepository {
    db: Arc<Database>,
}

impl PgBookingRepository {
    /// Create a new PostgreSQL booking repository
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    async fn pool(&self) -> RepositoryResult<DbPool> {
        self.db
            .ensure_connection()
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))
    }

    fn row_to_booking(row: &sqlx::postgres::PgRow) -> RepositoryResult<Booking> {
        Ok(Booking {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            email: row.try_get("email")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl Repository for PgBookingRepository {
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
impl BookingRepository for PgBookingRepository {
    async fn insert(&self, booking: &NewBooking) -> RepositoryResult<Booking> {
        let pool = self.pool().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO bookings (id, event_id, email, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, event_id, email, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.event_id)
        .bind(&booking.email)
        .bind(Utc::now())
        .fetch_one(&pool)
        .instrument(db_span!("insert", "bookings"))
        .await
        .map_err(RepositoryError::from_sqlx)?;

        Self::row_to_booking(&row)
    }

    async fn count_for_event(&self, event_id: Uuid) -> RepositoryResult<i64> {
        let pool = self.pool().await?;

        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&pool)
            .instrument(db_span!("count_for_event", "bookings"))
            .await
            .map_err(RepositoryError::from_sqlx)
    }
}
