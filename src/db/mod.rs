//! Database module for DevEvent
//!
//! This module provides the lazily-opened connection, the embedded schema
//! migrations, and the PostgreSQL repositories for events and bookings.

pub mod booking_repo;
pub mod connection;
pub mod event_repo;
pub mod repository;

// Re-export commonly used types
pub use booking_repo::{BookingRepository, PgBookingRepository};
pub use connection::{create_pool, ConnectionManager, Connector, Database, DbPool, PgConnector};
pub use event_repo::{EventRepository, PgEventRepository};
pub use repository::{Repository, RepositoryError, RepositoryResult};

use sqlx::migrate::Migrator;

/// Unique index on `events.slug`
pub const EVENT_SLUG_CONSTRAINT: &str = "events_slug_key";

/// Unique index on `bookings (event_id, email)`
pub const BOOKING_UNIQUE_CONSTRAINT: &str = "bookings_event_id_email_key";

/// Foreign key from `bookings.event_id` to `events.id`
pub const BOOKING_EVENT_FK: &str = "bookings_event_id_fkey";

/// Database migrator for running schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_embedded() {
        let descriptions: Vec<_> = MIGRATOR.iter().map(|m| m.description.to_string()).collect();
        assert!(descriptions.iter().any(|d| d.contains("events")));
        assert!(descriptions.iter().any(|d| d.contains("bookings")));
    }
}
