//! Event data models for DevEvent
//!
//! This module defines the event structures used throughout the service:
//! the raw input submitted by clients, the normalized record produced by the
//! validator, and the stored event returned by the query layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::error::{ValidationError, ValidationErrorKind, ValidationErrors};
use super::validation::{
    clean_list, normalize_date, normalize_time, slugify, suffixed_slug, validate_image_url,
    validate_mode,
};
use crate::db::EventRepository;
use crate::error::Result;

/// How attendees take part in an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMode {
    /// Remote only
    Online,
    /// In person only
    Offline,
    /// Both remote and in person
    Hybrid,
}

impl EventMode {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EventMode::Online => "online",
            EventMode::Offline => "offline",
            EventMode::Hybrid => "hybrid",
        }
    }
}

impl FromStr for EventMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "online" => Ok(EventMode::Online),
            "offline" => Ok(EventMode::Offline),
            "hybrid" => Ok(EventMode::Hybrid),
            _ => Err(ValidationError::with_context(
                ValidationErrorKind::InvalidMode,
                "mode",
                format!("(got {:?})", s),
            )),
        }
    }
}

impl std::fmt::Display for EventMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Event fields as submitted by a client.
///
/// Missing fields deserialize to empty values so that the validator can
/// report every problem at once instead of failing on the first absent key.
/// A client-supplied `slug` is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct EventInput {
    #[validate(length(min = 1, code = "required"))]
    pub title: String,

    #[validate(length(min = 1, code = "required"))]
    pub description: String,

    #[validate(length(min = 1, code = "required"))]
    pub overview: String,

    #[validate(length(min = 1, code = "required"))]
    pub image: String,

    #[validate(length(min = 1, code = "required"))]
    pub venue: String,

    #[validate(length(min = 1, code = "required"))]
    pub location: String,

    /// Calendar date, `YYYY-MM-DD`
    #[validate(length(min = 1, code = "required"))]
    pub date: String,

    /// Wall-clock time, `H:MM` or `HH:MM`
    #[validate(length(min = 1, code = "required"))]
    pub time: String,

    /// One of `online`, `offline`, `hybrid`
    #[validate(custom(function = "validate_mode"))]
    pub mode: String,

    #[validate(length(min = 1, code = "required"))]
    pub audience: String,

    #[validate(length(min = 1, code = "empty_list"))]
    pub agenda: Vec<String>,

    #[validate(length(min = 1, code = "required"))]
    pub organizer: String,

    #[validate(length(min = 1, code = "empty_list"))]
    pub tags: Vec<String>,
}

impl EventInput {
    /// Trim every string field and drop blank list entries
    pub fn trimmed(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            overview: self.overview.trim().to_string(),
            image: self.image.trim().to_string(),
            venue: self.venue.trim().to_string(),
            location: self.location.trim().to_string(),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            mode: self.mode.trim().to_string(),
            audience: self.audience.trim().to_string(),
            agenda: clean_list(self.agenda),
            organizer: self.organizer.trim().to_string(),
            tags: clean_list(self.tags),
        }
    }

    /// Check required fields, list sizes, the mode and the image URL.
    ///
    /// Date and time formats are checked by the normalizer because they are
    /// only re-validated when the field changes.
    pub fn validate_fields(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(report) = self.validate() {
            let mut failures: Vec<_> = report.field_errors().into_iter().collect();
            failures.sort_by(|a, b| a.0.cmp(&b.0));

            for (field, field_errors) in failures {
                let kind = match field_errors.first().map(|e| e.code.as_ref()) {
                    Some("empty_list") => ValidationErrorKind::EmptyList,
                    Some("invalid_mode") if !self.mode.is_empty() => {
                        ValidationErrorKind::InvalidMode
                    },
                    Some(_) => ValidationErrorKind::RequiredField,
                    None => continue,
                };
                errors.add(ValidationError::new(kind, field.to_string()));
            }
        }

        if !self.image.is_empty() {
            errors.collect(validate_image_url(&self.image, "image"));
        }

        errors.into_result(())
    }

    /// Build an input from `multipart/form-data` text fields.
    ///
    /// Keys are trimmed. `tags` and `agenda` are expected as JSON-encoded
    /// arrays; tags fall back to a comma-separated list, agenda has no
    /// fallback. `image` is the already-resolved image URL.
    pub fn from_form_fields(
        fields: HashMap<String, String>,
        image: String,
    ) -> std::result::Result<Self, ValidationErrors> {
        let mut fields: HashMap<String, String> = fields
            .into_iter()
            .map(|(key, value)| (key.trim().to_string(), value))
            .collect();
        let mut take = |name: &str| fields.remove(name).unwrap_or_default();

        let mut errors = ValidationErrors::new();

        let raw_tags = take("tags");
        let tags = serde_json::from_str::<Vec<String>>(&raw_tags)
            .unwrap_or_else(|_| raw_tags.split(',').map(|t| t.trim().to_string()).collect());

        let raw_agenda = take("agenda");
        let agenda = if raw_agenda.trim().is_empty() {
            Vec::new()
        } else {
            match serde_json::from_str::<Vec<String>>(&raw_agenda) {
                Ok(items) => items,
                Err(_) => {
                    errors.add(ValidationError::with_context(
                        ValidationErrorKind::InvalidFormat,
                        "agenda",
                        "(expected a JSON array of strings)",
                    ));
                    Vec::new()
                },
            }
        };

        let input = Self {
            title: take("title"),
            description: take("description"),
            overview: take("overview"),
            image,
            venue: take("venue"),
            location: take("location"),
            date: take("date"),
            time: take("time"),
            mode: take("mode"),
            audience: take("audience"),
            agenda,
            organizer: take("organizer"),
            tags,
        };

        errors.into_result(input)
    }
}

impl From<&Event> for EventInput {
    fn from(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
            overview: event.overview.clone(),
            image: event.image.clone(),
            venue: event.venue.clone(),
            location: event.location.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            mode: event.mode.as_str().to_string(),
            audience: event.audience.clone(),
            agenda: event.agenda.clone(),
            organizer: event.organizer.clone(),
            tags: event.tags.clone(),
        }
    }
}

/// Which derived fields need recomputing for a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventChanges {
    pub title: bool,
    pub date: bool,
    pub time: bool,
}

impl EventChanges {
    /// Everything is new
    pub const ALL: EventChanges = EventChanges {
        title: true,
        date: true,
        time: true,
    };

    /// Compare a (trimmed) input against the stored record it replaces
    pub fn between(previous: Option<&Event>, input: &EventInput) -> Self {
        match previous {
            None => Self::ALL,
            Some(prev) => Self {
                title: prev.title != input.title,
                date: prev.date != input.date,
                time: prev.time != input.time,
            },
        }
    }
}

/// Validated event ready to be written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
}

impl NormalizedEvent {
    /// Attach store-assigned identity and timestamps
    pub fn into_event(self, id: Uuid, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            slug: self.slug,
            description: self.description,
            overview: self.overview,
            image: self.image,
            venue: self.venue,
            location: self.location,
            date: self.date,
            time: self.time,
            mode: self.mode,
            audience: self.audience,
            agenda: self.agenda,
            organizer: self.organizer,
            tags: self.tags,
            created_at,
            updated_at,
        }
    }

    /// Replace the slug with a timestamp-suffixed variant of the title slug
    pub fn with_suffixed_slug(mut self, epoch_millis: i64) -> Self {
        self.slug = suffixed_slug(&slugify(&self.title), epoch_millis);
        self
    }
}

/// Stored event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: EventMode,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether the two events have at least one tag in common
    pub fn shares_tag_with(&self, tags: &[String]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

/// Validate and normalize an event before it is written.
///
/// `previous` is the stored record being replaced, if any; only the derived
/// fields whose source changed (slug from title, date, time) are recomputed.
/// The slug is checked against other events and suffixed with the current
/// millisecond epoch when taken. That check is advisory: the unique index on
/// `events.slug` decides, and the query layer handles the race.
pub async fn prepare_event(
    input: EventInput,
    previous: Option<&Event>,
    events: &dyn EventRepository,
) -> Result<NormalizedEvent> {
    let input = input.trimmed();
    let changes = EventChanges::between(previous, &input);

    let mut errors = match input.validate_fields() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    let date = match previous {
        Some(prev) if !changes.date => Some(prev.date.clone()),
        _ if input.date.is_empty() => None,
        _ => errors.collect(normalize_date(&input.date, "date")),
    };

    let time = match previous {
        Some(prev) if !changes.time => Some(prev.time.clone()),
        _ if input.time.is_empty() => None,
        _ => errors.collect(normalize_time(&input.time, "time")),
    };

    let base_slug = slugify(&input.title);
    if changes.title && !input.title.is_empty() && base_slug.is_empty() {
        errors.add(ValidationError::new(ValidationErrorKind::InvalidTitle, "title"));
    }

    let mode = if input.mode.is_empty() {
        None
    } else {
        EventMode::from_str(&input.mode).ok()
    };

    let (Some(date), Some(time), Some(mode)) = (date, time, mode) else {
        return Err(errors.into());
    };
    errors.into_result(())?;

    let slug = match previous {
        Some(prev) if !changes.title => prev.slug.clone(),
        _ => unique_slug(&base_slug, previous.map(|p| p.id), events).await?,
    };

    Ok(NormalizedEvent {
        title: input.title,
        slug,
        description: input.description,
        overview: input.overview,
        image: input.image,
        venue: input.venue,
        location: input.location,
        date,
        time,
        mode,
        audience: input.audience,
        agenda: input.agenda,
        organizer: input.organizer,
        tags: input.tags,
    })
}

/// The base slug, or a timestamp-suffixed one if another event holds it
async fn unique_slug(
    base: &str,
    exclude: Option<Uuid>,
    events: &dyn EventRepository,
) -> Result<String> {
    if events.slug_in_use(base, exclude).await? {
        Ok(suffixed_slug(base, Utc::now().timestamp_millis()))
    } else {
        Ok(base.to_string())
    }
}

/// Builder for creating test event inputs
#[cfg(test)]
pub struct EventInputBuilder {
    input: EventInput,
}

#[cfg(test)]
impl EventInputBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            input: crate::test_utils::sample_event_input(title),
        }
    }

    pub fn date(mut self, date: &str) -> Self {
        self.input.date = date.to_string();
        self
    }

    pub fn time(mut self, time: &str) -> Self {
        self.input.time = time.to_string();
        self
    }

    pub fn mode(mut self, mode: &str) -> Self {
        self.input.mode = mode.to_string();
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.input.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn agenda(mut self, agenda: &[&str]) -> Self {
        self.input.agenda = agenda.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn build(self) -> EventInput {
        self.input
    }
}
