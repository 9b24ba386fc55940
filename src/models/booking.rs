//! Booking data models for DevEvent

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{ValidationError, ValidationErrorKind, ValidationErrors};
use super::validation::{normalize_email, validate_required, validate_uuid_field};
use crate::db::EventRepository;
use crate::error::Result;

/// Booking request as submitted by a client
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingInput {
    pub event_id: String,
    pub email: String,
}

impl BookingInput {
    pub fn new(event_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            email: email.into(),
        }
    }
}

/// Validated booking ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub event_id: Uuid,
    /// Trimmed, lower-cased address
    pub email: String,
}

/// Stored booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate a booking before it is written.
///
/// The referenced event is looked up only when the booking is new or its
/// event changed. The lookup gives an early `EventNotFound`; the foreign key
/// on `bookings.event_id` is what actually guarantees the reference.
pub async fn prepare_booking(
    input: BookingInput,
    previous: Option<&Booking>,
    events: &dyn EventRepository,
) -> Result<NewBooking> {
    let mut errors = ValidationErrors::new();

    let event_id = match validate_required(&input.event_id, "eventId") {
        Ok(()) => errors.collect(validate_uuid_field(&input.event_id, "eventId")),
        Err(e) => {
            errors.add(e);
            None
        },
    };
    let email = errors.collect(normalize_email(&input.email, "email"));

    let (Some(event_id), Some(email)) = (event_id, email) else {
        return Err(errors.into());
    };

    let reference_changed = previous.map_or(true, |prev| prev.event_id != event_id);
    if reference_changed && !events.exists(event_id).await? {
        return Err(ValidationError::with_context(
            ValidationErrorKind::EventNotFound,
            "eventId",
            format!("(no event with ID {})", event_id),
        )
        .into());
    }

    Ok(NewBooking { event_id, email })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventInputBuilder;
    use crate::test_utils::MemoryStore;

    #[tokio::test]
    async fn test_prepare_booking_normalizes_email() {
        let store = MemoryStore::new();
        let event = store.seed_event(EventInputBuilder::new("Booked Event").build());

        let booking = prepare_booking(
            BookingInput::new(event.id.to_string(), "  Grace@Example.ORG "),
            None,
            &store,
        )
        .await
        .unwrap();

        assert_eq!(booking.event_id, event.id);
        assert_eq!(booking.email, "grace@example.org");
    }

    #[tokio::test]
    async fn test_prepare_booking_requires_fields() {
        let store = MemoryStore::new();
        let err = prepare_booking(BookingInput::default(), None, &store).await.unwrap_err();

        match err {
            crate::error::Error::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.has_field("eventId"));
                assert!(errors.has_field("email"));
                assert!(errors
                    .errors()
                    .iter()
                    .all(|e| e.kind == ValidationErrorKind::RequiredField));
            },
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prepare_booking_rejects_bad_email() {
        let store = MemoryStore::new();
        let event = store.seed_event(EventInputBuilder::new("Email Check").build());

        let err = prepare_booking(BookingInput::new(event.id.to_string(), "not-an-email"), None, &store)
            .await
            .unwrap_err();
        assert_eq!(err.validation_kind(), Some(&ValidationErrorKind::InvalidEmail));
    }

    #[tokio::test]
    async fn test_prepare_booking_rejects_malformed_event_id() {
        let store = MemoryStore::new();
        let err = prepare_booking(BookingInput::new("64f1c0ffee", "a@b.co"), None, &store)
            .await
            .unwrap_err();
        assert_eq!(err.validation_kind(), Some(&ValidationErrorKind::InvalidId));
    }

    #[tokio::test]
    async fn test_prepare_booking_missing_event() {
        let store = MemoryStore::new();
        let err = prepare_booking(
            BookingInput::new(Uuid::new_v4().to_string(), "a@b.co"),
            None,
            &store,
        )
        .await
        .unwrap_err();
        assert!(err.is_event_not_found());
    }

    #[tokio::test]
    async fn test_prepare_booking_skips_lookup_when_reference_unchanged() {
        let store = MemoryStore::new();
        let orphan_event = Uuid::new_v4();
        let previous = Booking {
            id: Uuid::new_v4(),
            event_id: orphan_event,
            email: "old@example.com".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let booking = prepare_booking(
            BookingInput::new(orphan_event.to_string(), "new@example.com"),
            Some(&previous),
            &store,
        )
        .await
        .unwrap();
        assert_eq!(booking.email, "new@example.com");
    }
}
