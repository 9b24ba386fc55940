//! Test utilities for DevEvent
//!
//! An in-memory store implementing both repositories with the same
//! constraint behaviour as the PostgreSQL schema, plus failure injection.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::db::repository::{Repository, RepositoryError, RepositoryResult};
use crate::db::{
    BookingRepository, EventRepository, BOOKING_EVENT_FK, BOOKING_UNIQUE_CONSTRAINT,
    EVENT_SLUG_CONSTRAINT,
};
use crate::models::validation::{normalize_date, normalize_time, slugify, suffixed_slug};
use crate::models::{Booking, Event, EventInput, EventMode, NewBooking, NormalizedEvent};

#[derive(Debug, Default)]
struct StoreState {
    /// Insertion order is creation order
    events: Vec<Event>,
    bookings: Vec<Booking>,
}

/// In-memory implementation of [`EventRepository`] and [`BookingRepository`]
///
/// Clones share state, so one store can back both repository handles of a
/// service.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_next: Arc<Mutex<Option<String>>>,
    blind: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the store to fail on the next operation
    pub fn fail_next_operation(&self, error_message: &str) {
        *self.fail_next.lock().unwrap() = Some(error_message.to_string());
    }

    /// Make `slug_in_use` and `exists` answer as if they ran before any
    /// competing write landed. Writes still enforce every constraint.
    pub fn blind_existence_checks(&self) {
        self.blind.store(true, Ordering::SeqCst);
    }

    /// Insert an event directly, bypassing validation of optional formats.
    ///
    /// Panics when the input cannot be normalized; meant for test fixtures.
    pub fn seed_event(&self, input: EventInput) -> Event {
        let input = input.trimmed();
        let mut state = self.state.lock().unwrap();

        let base = slugify(&input.title);
        let mut slug = base.clone();
        let mut suffix = Utc::now().timestamp_millis();
        while state.events.iter().any(|e| e.slug == slug) {
            slug = suffixed_slug(&base, suffix);
            suffix += 1;
        }

        // Strictly increasing timestamps keep newest-first ordering stable
        let created_at = state
            .events
            .last()
            .map(|last| (last.created_at + Duration::milliseconds(1)).max(Utc::now()))
            .unwrap_or_else(Utc::now);

        let normalized = NormalizedEvent {
            title: input.title,
            slug,
            description: input.description,
            overview: input.overview,
            image: input.image,
            venue: input.venue,
            location: input.location,
            date: normalize_date(&input.date, "date").unwrap(),
            time: normalize_time(&input.time, "time").unwrap(),
            mode: EventMode::from_str(&input.mode).unwrap(),
            audience: input.audience,
            agenda: input.agenda,
            organizer: input.organizer,
            tags: input.tags,
        };
        let event = normalized.into_event(Uuid::new_v4(), created_at, created_at);
        state.events.push(event.clone());
        event
    }

    /// Snapshot of every stored event, oldest first
    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().events.clone()
    }

    /// Snapshot of every stored booking, oldest first
    pub fn bookings(&self) -> Vec<Booking> {
        self.state.lock().unwrap().bookings.clone()
    }

    fn check_failure(&self) -> RepositoryResult<()> {
        match self.fail_next.lock().unwrap().take() {
            Some(msg) => Err(RepositoryError::QueryExecution(msg)),
            None => Ok(()),
        }
    }

    fn is_blind(&self) -> bool {
        self.blind.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn health_check(&self) -> RepositoryResult<()> {
        self.check_failure()
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list_newest_first(&self) -> RepositoryResult<Vec<Event>> {
        self.check_failure()?;
        let state = self.state.lock().unwrap();
        Ok(state.events.iter().rev().cloned().collect())
    }

    async fn find_by_slug(&self, slug: &str) -> RepositoryResult<Option<Event>> {
        self.check_failure()?;
        let state = self.state.lock().unwrap();
        Ok(state.events.iter().find(|e| e.slug == slug).cloned())
    }

    async fn exists(&self, id: Uuid) -> RepositoryResult<bool> {
        self.check_failure()?;
        if self.is_blind() {
            return Ok(true);
        }
        let state = self.state.lock().unwrap();
        Ok(state.events.iter().any(|e| e.id == id))
    }

    async fn slug_in_use(&self, slug: &str, exclude: Option<Uuid>) -> RepositoryResult<bool> {
        self.check_failure()?;
        if self.is_blind() {
            return Ok(false);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .iter()
            .any(|e| e.slug == slug && Some(e.id) != exclude))
    }

    async fn find_sharing_tags(
        &self,
        tags: &[String],
        exclude_id: Uuid,
    ) -> RepositoryResult<Vec<Event>> {
        self.check_failure()?;
        let state = self.state.lock().unwrap();
        Ok(state
            .events
            .iter()
            .filter(|e| e.id != exclude_id && e.shares_tag_with(tags))
            .cloned()
            .collect())
    }

    async fn insert(&self, event: &NormalizedEvent) -> RepositoryResult<Event> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();

        if state.events.iter().any(|e| e.slug == event.slug) {
            return Err(RepositoryError::Conflict(EVENT_SLUG_CONSTRAINT.to_string()));
        }

        let now = state
            .events
            .last()
            .map(|last| (last.created_at + Duration::milliseconds(1)).max(Utc::now()))
            .unwrap_or_else(Utc::now);
        let stored = event.clone().into_event(Uuid::new_v4(), now, now);
        state.events.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: Uuid, event: &NormalizedEvent) -> RepositoryResult<Event> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();

        if state.events.iter().any(|e| e.slug == event.slug && e.id != id) {
            return Err(RepositoryError::Conflict(EVENT_SLUG_CONSTRAINT.to_string()));
        }

        let existing = state
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| RepositoryError::NotFound(format!("event {}", id)))?;

        let updated = event.clone().into_event(id, existing.created_at, Utc::now());
        *existing = updated.clone();
        Ok(updated)
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: &NewBooking) -> RepositoryResult<Booking> {
        self.check_failure()?;
        let mut state = self.state.lock().unwrap();

        if !state.events.iter().any(|e| e.id == booking.event_id) {
            return Err(RepositoryError::MissingReference(BOOKING_EVENT_FK.to_string()));
        }
        if state
            .bookings
            .iter()
            .any(|b| b.event_id == booking.event_id && b.email == booking.email)
        {
            return Err(RepositoryError::Conflict(BOOKING_UNIQUE_CONSTRAINT.to_string()));
        }

        let now = Utc::now();
        let stored = Booking {
            id: Uuid::new_v4(),
            event_id: booking.event_id,
            email: booking.email.clone(),
            created_at: now,
            updated_at: now,
        };
        state.bookings.push(stored.clone());
        Ok(stored)
    }

    async fn count_for_event(&self, event_id: Uuid) -> RepositoryResult<i64> {
        self.check_failure()?;
        let state = self.state.lock().unwrap();
        Ok(state.bookings.iter().filter(|b| b.event_id == event_id).count() as i64)
    }
}

/// A complete, valid event input with the given title
pub fn sample_event_input(title: &str) -> EventInput {
    EventInput {
        title: title.to_string(),
        description: "A gathering of developers".to_string(),
        overview: "Talks, workshops and networking".to_string(),
        image: "https://images.example.com/banner.png".to_string(),
        venue: "Moscone Center".to_string(),
        location: "San Francisco, CA".to_string(),
        date: "2026-09-09".to_string(),
        time: "09:00".to_string(),
        mode: "hybrid".to_string(),
        audience: "Developers".to_string(),
        agenda: vec!["Keynote".to_string(), "Workshops".to_string()],
        organizer: "DevEvent".to_string(),
        tags: vec!["rust".to_string(), "web".to_string()],
    }
}
