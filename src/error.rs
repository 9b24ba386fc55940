//! Error handling module for DevEvent
//!
//! This module defines the error types used throughout the application,
//! providing a unified error handling strategy with proper error context
//! and HTTP response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::error::{ValidationErrorKind, ValidationErrors};

/// Result type alias for DevEvent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown to clients when a booking already exists
pub const DUPLICATE_BOOKING_MESSAGE: &str = "You have already booked this event.";

/// Main error type for DevEvent
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Field-level validation failures for incoming entities
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    /// Malformed request input that is not tied to an entity field
    #[error("{0}")]
    InvalidInput(String),

    /// Not found errors
    #[error("{0}")]
    NotFound(String),

    /// The (event, email) pair is already booked
    #[error("{}", DUPLICATE_BOOKING_MESSAGE)]
    DuplicateBooking,

    /// Image storage errors
    #[error("Upload error: {0}")]
    Upload(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a database error
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Error::Database(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create an upload error
    pub fn upload<S: Into<String>>(msg: S) -> Self {
        Error::Upload(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// The first validation kind carried by this error, if it is a validation error
    pub fn validation_kind(&self) -> Option<&ValidationErrorKind> {
        match self {
            Error::Validation(errors) => errors.first().map(|e| &e.kind),
            _ => None,
        }
    }

    /// True when a booking referenced an event that does not exist
    pub fn is_event_not_found(&self) -> bool {
        matches!(self.validation_kind(), Some(ValidationErrorKind::EventNotFound))
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) if self.is_event_not_found() => StatusCode::NOT_FOUND,
            Error::Validation(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::DuplicateBooking => StatusCode::CONFLICT,
            Error::Config(_)
            | Error::Database(_)
            | Error::Upload(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this error is a server-side failure whose detail must be hidden
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message safe to show to clients.
    ///
    /// Server-side failures collapse to `fallback` unless `expose_details` is set,
    /// in which case the underlying message is returned.
    pub fn public_message(&self, fallback: &str, expose_details: bool) -> String {
        if self.is_internal() && !expose_details {
            fallback.to_string()
        } else {
            self.to_string()
        }
    }

    /// Log the error at a level matching its severity
    pub fn log(&self) {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = ?self, "Internal server error");
            },
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::CONFLICT => {
                tracing::warn!(error = %self, "Client error");
            },
            _ => {
                tracing::info!(error = %self, "Request error");
            },
        }
    }
}

/// Implement IntoResponse for automatic error responses in Axum
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        self.log();

        let body = Json(json!({
            "error": self.public_message("An unexpected error occurred.", false),
            "type": error_type(&self),
        }));

        (status, body).into_response()
    }
}

/// Get a string representation of the error type
fn error_type(error: &Error) -> &'static str {
    match error {
        Error::Config(_) => "configuration_error",
        Error::Database(_) => "database_error",
        Error::Validation(_) => "validation_error",
        Error::InvalidInput(_) => "invalid_input",
        Error::NotFound(_) => "not_found",
        Error::DuplicateBooking => "duplicate_booking",
        Error::Upload(_) => "upload_error",
        Error::Internal(_) => "internal_error",
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}
