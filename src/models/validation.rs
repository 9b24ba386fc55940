//! Custom validation functions for DevEvent models
//!
//! This module provides reusable validation and normalization functions for
//! the event and booking fields: slugs, calendar dates, wall-clock times,
//! email addresses and image URLs.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use uuid::Uuid;

use super::error::{ValidationError, ValidationErrorKind, ValidationResult};

// Lazy static regex patterns
static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static SLUG_STRIP_REGEX: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();
static HYPHENS_REGEX: OnceLock<Regex> = OnceLock::new();

fn date_regex() -> &'static Regex {
    DATE_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("Invalid date regex pattern")
    })
}

fn time_regex() -> &'static Regex {
    TIME_REGEX.get_or_init(|| {
        Regex::new(r"^([0-1]?[0-9]|2[0-3]):([0-5][0-9])$").expect("Invalid time regex pattern")
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex pattern")
    })
}

/// Absolute http(s) URL or a root-relative path such as `/uploads/banner.png`
fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| {
        Regex::new(r"^(https?://[^\s/]+(/\S*)?|/[^\s/]\S*)$").expect("Invalid URL regex pattern")
    })
}

fn slug_strip_regex() -> &'static Regex {
    SLUG_STRIP_REGEX
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("Invalid slug regex pattern"))
}

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex pattern"))
}

fn hyphens_regex() -> &'static Regex {
    HYPHENS_REGEX.get_or_init(|| Regex::new(r"-+").expect("Invalid hyphen regex pattern"))
}

/// Derive a URL-safe slug from a title.
///
/// Lower-cases and trims the title, drops everything except ASCII word
/// characters, whitespace and hyphens, turns whitespace runs into single
/// hyphens and collapses repeated hyphens.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = slug_strip_regex().replace_all(lowered.trim(), "");
    let hyphenated = whitespace_regex().replace_all(&stripped, "-");
    hyphens_regex().replace_all(&hyphenated, "-").into_owned()
}

/// Slug with a millisecond-epoch suffix, used when the plain slug is taken
pub fn suffixed_slug(base: &str, epoch_millis: i64) -> String {
    format!("{}-{}", base, epoch_millis)
}

/// Normalize a `YYYY-MM-DD` date to its canonical form.
///
/// The value is read as a plain calendar date, so no timezone can shift the
/// day during the round trip.
pub fn normalize_date(value: &str, field_name: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if !date_regex().is_match(trimmed) {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidDateFormat,
            field_name,
        ));
    }

    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| {
        ValidationError::with_context(
            ValidationErrorKind::InvalidDateFormat,
            field_name,
            format!("({})", e),
        )
    })?;

    Ok(parsed.format("%Y-%m-%d").to_string())
}

/// Normalize an `H:MM` / `HH:MM` 24-hour time, zero-padding the hour
pub fn normalize_time(value: &str, field_name: &str) -> ValidationResult<String> {
    let captures = time_regex().captures(value.trim()).ok_or_else(|| {
        ValidationError::new(ValidationErrorKind::InvalidTimeFormat, field_name)
    })?;

    let hour = &captures[1];
    let minute = &captures[2];
    Ok(format!("{:0>2}:{}", hour, minute))
}

/// Trim and lower-case an email address, then check its shape
pub fn normalize_email(value: &str, field_name: &str) -> ValidationResult<String> {
    let email = value.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorKind::RequiredField,
            field_name,
        ));
    }
    if !email_regex().is_match(&email) {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidEmail,
            field_name,
        ));
    }
    Ok(email)
}

/// Validate an image URL
pub fn validate_image_url(url: &str, field_name: &str) -> ValidationResult<()> {
    if url_regex().is_match(url) {
        Ok(())
    } else {
        Err(ValidationError::with_context(
            ValidationErrorKind::InvalidUrl,
            field_name,
            format!("({})", url),
        ))
    }
}

/// Validate UUID format returning our custom error type
pub fn validate_uuid_field(uuid_str: &str, field_name: &str) -> ValidationResult<Uuid> {
    Uuid::parse_str(uuid_str.trim()).map_err(|e| {
        ValidationError::with_context(
            ValidationErrorKind::InvalidId,
            field_name,
            format!("({})", e),
        )
    })
}

/// Validate a required field is not empty
pub fn validate_required(value: &str, field_name: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        Err(ValidationError::new(
            ValidationErrorKind::RequiredField,
            field_name,
        ))
    } else {
        Ok(())
    }
}

/// Event mode check in the shape expected by the `validator` derive
pub fn validate_mode(mode: &str) -> Result<(), validator::ValidationError> {
    match mode {
        "online" | "offline" | "hybrid" => Ok(()),
        _ => Err(validator::ValidationError::new("invalid_mode")),
    }
}

/// Trim every entry of a list and drop the blank ones
pub fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
