//! Query layer for DevEvent
//!
//! [`EventService`] is the single entry point used by the HTTP handlers and
//! pages. It runs the entity validators before every write and turns storage
//! constraint violations into domain errors.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    BookingRepository, EventRepository, BOOKING_EVENT_FK, BOOKING_UNIQUE_CONSTRAINT,
    EVENT_SLUG_CONSTRAINT,
};
use crate::error::{Error, Result};
use crate::models::{
    prepare_booking, prepare_event, Booking, BookingInput, Event, EventInput, ValidationError,
    ValidationErrorKind,
};

/// Inserts attempted for one event before a slug conflict is reported
const MAX_SLUG_ATTEMPTS: usize = 3;

/// Event and booking operations over the repositories
#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { events, bookings }
    }

    /// All events, most recently created first
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        Ok(self.events.list_newest_first().await?)
    }

    /// Resolve a slug (trimmed, case-insensitive) to its event
    pub async fn find_event_by_slug(&self, slug: &str) -> Result<Event> {
        let normalized = normalize_slug(slug)?;

        self.events
            .find_by_slug(&normalized)
            .await?
            .ok_or_else(|| Error::not_found(format!("Event with slug \"{}\" not found.", slug)))
    }

    /// Other events sharing at least one tag with the event at `slug`.
    ///
    /// Never fails: an unknown slug or a storage error yields an empty list.
    pub async fn find_similar_events(&self, slug: &str) -> Vec<Event> {
        let event = match self.find_event_by_slug(slug).await {
            Ok(event) => event,
            Err(Error::NotFound(_)) | Err(Error::InvalidInput(_)) => return Vec::new(),
            Err(e) => {
                crate::log_error!(e, "Failed to resolve event for similar events", slug = slug);
                return Vec::new();
            },
        };

        match self.events.find_sharing_tags(&event.tags, event.id).await {
            Ok(similar) => similar,
            Err(e) => {
                crate::log_error!(e, "Failed to fetch similar events", slug = slug);
                Vec::new()
            },
        }
    }

    /// Validate and store a new event.
    ///
    /// If another writer takes the slug between the availability check and
    /// the insert, the slug is re-derived with a timestamp suffix and the
    /// insert retried.
    pub async fn create_event(&self, input: EventInput) -> Result<Event> {
        let mut normalized = prepare_event(input, None, self.events.as_ref()).await?;

        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            match self.events.insert(&normalized).await {
                Ok(event) => {
                    tracing::info!(event_id = %event.id, slug = %event.slug, "Event created");
                    return Ok(event);
                },
                Err(e) if e.is_conflict_on(EVENT_SLUG_CONSTRAINT) && attempt < MAX_SLUG_ATTEMPTS => {
                    tracing::warn!(slug = %normalized.slug, attempt, "Slug taken, retrying with suffix");
                    let millis = Utc::now().timestamp_millis() + attempt as i64 - 1;
                    normalized = normalized.with_suffixed_slug(millis);
                },
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::internal("Could not allocate a unique slug"))
    }

    /// Re-validate and save an existing event.
    ///
    /// Only the derived fields whose source changed are recomputed.
    pub async fn update_event(&self, slug: &str, input: EventInput) -> Result<Event> {
        let previous = self.find_event_by_slug(slug).await?;
        let normalized = prepare_event(input, Some(&previous), self.events.as_ref()).await?;

        match self.events.update(previous.id, &normalized).await {
            Ok(event) => {
                tracing::info!(event_id = %event.id, slug = %event.slug, "Event updated");
                Ok(event)
            },
            Err(e) if e.is_conflict_on(EVENT_SLUG_CONSTRAINT) => {
                let retry = normalized.with_suffixed_slug(Utc::now().timestamp_millis());
                Ok(self.events.update(previous.id, &retry).await?)
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Book a seat for `email` at the event with ID `event_id`
    pub async fn create_booking(&self, event_id: &str, email: &str) -> Result<Booking> {
        let booking =
            prepare_booking(BookingInput::new(event_id, email), None, self.events.as_ref()).await?;

        match self.bookings.insert(&booking).await {
            Ok(stored) => {
                tracing::info!(booking_id = %stored.id, event_id = %stored.event_id, "Booking created");
                Ok(stored)
            },
            Err(e) if e.is_conflict_on(BOOKING_UNIQUE_CONSTRAINT) => Err(Error::DuplicateBooking),
            Err(e) if e.is_missing_reference_on(BOOKING_EVENT_FK) => {
                Err(ValidationError::with_context(
                    ValidationErrorKind::EventNotFound,
                    "eventId",
                    format!("(no event with ID {})", booking.event_id),
                )
                .into())
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Number of bookings for an event
    pub async fn count_bookings(&self, event_id: Uuid) -> Result<i64> {
        Ok(self.bookings.count_for_event(event_id).await?)
    }

    /// Check that the store answers
    pub async fn health_check(&self) -> Result<()> {
        self.events.health_check().await?;
        Ok(())
    }
}

fn normalize_slug(slug: &str) -> Result<String> {
    let normalized = slug.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(Error::invalid_input(
            "Invalid slug parameter. Slug must be a non-empty string.",
        ));
    }
    Ok(normalized)
}
