//! Validation error types for DevEvent models
//!
//! This module defines error types specifically for data validation,
//! separate from the general application errors.

use std::fmt;
use thiserror::Error;

/// Main validation error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The kind of validation error
    pub kind: ValidationErrorKind,
    /// The field that failed validation
    pub field: String,
    /// Optional additional context
    pub context: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(kind: ValidationErrorKind, field: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            context: None,
        }
    }

    /// Create a validation error with additional context
    pub fn with_context(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            context: Some(context.into()),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{}: {} {}", self.field, self.kind, ctx),
            None => write!(f, "{}: {}", self.field, self.kind),
        }
    }
}

/// Specific validation error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Field is required but missing or blank
    #[error("is required")]
    RequiredField,

    /// List field must contain at least one item
    #[error("must contain at least one item")]
    EmptyList,

    /// Event mode outside the enumerated values
    #[error("must be either online, offline, or hybrid")]
    InvalidMode,

    /// Title that yields no usable slug
    #[error("must contain at least one letter or digit")]
    InvalidTitle,

    /// Date not in YYYY-MM-DD form
    #[error("Invalid date format. Please provide date in YYYY-MM-DD format.")]
    InvalidDateFormat,

    /// Time not in HH:MM 24-hour form
    #[error("Invalid time format. Please use HH:MM format (e.g., 14:30).")]
    InvalidTimeFormat,

    /// Email that does not look like an address
    #[error("Please provide a valid email address")]
    InvalidEmail,

    /// Invalid URL format
    #[error("Invalid URL format")]
    InvalidUrl,

    /// Identifier that is not a UUID
    #[error("Invalid identifier format")]
    InvalidId,

    /// Submitted value has the wrong shape (e.g. not a JSON array)
    #[error("has an invalid format")]
    InvalidFormat,

    /// Referenced event does not exist
    #[error("Event does not exist")]
    EventNotFound,
}

/// Result type alias for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collection of validation errors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Record the error of a failed check, keeping the value of a passing one
    pub fn collect<T>(&mut self, result: ValidationResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(e);
                None
            },
        }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Get all errors
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// First recorded error
    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    /// Whether any error was recorded for `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Convert to a Result
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => write!(f, "No validation errors"),
            [single] => write!(f, "{}", single),
            many => {
                write!(f, "Validation failed with {} error(s):", many.len())?;
                for error in many {
                    write!(f, "\n  - {}", error)?;
                }
                Ok(())
            },
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }
}

impl From<ValidationError> for crate::error::Error {
    fn from(err: ValidationError) -> Self {
        crate::error::Error::Validation(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_creation() {
        let error = ValidationError::new(ValidationErrorKind::InvalidEmail, "email");
        assert_eq!(error.field, "email");
        assert!(error.context.is_none());
    }

    #[test]
    fn test_validation_error_with_context() {
        let error = ValidationError::with_context(
            ValidationErrorKind::InvalidDateFormat,
            "date",
            "got 09/09/2026",
        );
        assert_eq!(error.field, "date");
        assert_eq!(error.context.as_deref(), Some("got 09/09/2026"));
    }

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::new(ValidationErrorKind::RequiredField, "title");
        assert_eq!(error.to_string(), "title: is required");
    }

    #[test]
    fn test_single_error_display_has_no_header() {
        let errors: ValidationErrors =
            ValidationError::new(ValidationErrorKind::InvalidEmail, "email").into();
        assert_eq!(errors.to_string(), "email: Please provide a valid email address");
    }

    #[test]
    fn test_validation_errors_collection() {
        let mut errors = ValidationErrors::new();
        assert!(errors.is_empty());

        errors.add(ValidationError::new(ValidationErrorKind::RequiredField, "title"));
        let kept = errors.collect::<u8>(Err(ValidationError::new(
            ValidationErrorKind::EmptyList,
            "tags",
        )));
        assert!(kept.is_none());
        assert_eq!(errors.collect(Ok(7)), Some(7));

        assert_eq!(errors.len(), 2);
        assert!(errors.has_field("tags"));
        assert!(!errors.has_field("agenda"));
        assert!(errors.to_string().contains("2 error(s)"));
    }

    #[test]
    fn test_validation_errors_into_result() {
        let mut errors = ValidationErrors::new();
        let result = errors.clone().into_result("success");
        assert!(result.is_ok());

        errors.add(ValidationError::new(ValidationErrorKind::InvalidId, "eventId"));
        let result = errors.into_result("fail");
        assert!(result.is_err());
    }
}
