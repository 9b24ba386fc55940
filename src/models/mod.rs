//! Data models for DevEvent
//!
//! This module contains the domain models used throughout the application:
//! events, bookings, their validation errors, and the field normalizers that
//! run before every write.

pub mod booking;
pub mod error;
pub mod event;
pub mod validation;

// Re-export commonly used types
pub use booking::{prepare_booking, Booking, BookingInput, NewBooking};
pub use error::{ValidationError, ValidationErrorKind, ValidationErrors};
pub use event::{prepare_event, Event, EventChanges, EventInput, EventMode, NormalizedEvent};
pub use validation::{normalize_date, normalize_email, normalize_time, slugify};
