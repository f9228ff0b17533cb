use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const MAX_FIELD_LENGTH: usize = 255;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{L}[\p{L}'\-]*$").expect("name pattern is a valid regex"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be blank")]
    Blank(&'static str),
    #[error("{0} cannot be longer than {MAX_FIELD_LENGTH} characters")]
    TooLong(&'static str),
    #[error("{field} must contain only letters, hyphens or apostrophes: {value:?}")]
    InvalidName { field: &'static str, value: String },
    #[error("Date of birth must be in the past")]
    DateOfBirthNotInPast,
    #[error("Training duration must be positive")]
    NonPositiveDuration,
}

/// Person name validation (first or last name)
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    validate_required(field, value)?;

    if !NAME_PATTERN.is_match(value) {
        return Err(ValidationError::InvalidName {
            field,
            value: value.to_string(),
        });
    }

    Ok(())
}

/// Non-blank, bounded free text
pub fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }

    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::TooLong(field));
    }

    Ok(())
}

/// Optional free text: absent is fine, present must be non-blank
pub fn validate_optional(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(value) => validate_required(field, value),
        None => Ok(()),
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.trim().is_empty() {
        return Err(ValidationError::Blank("password"));
    }
    Ok(())
}

/// Date of birth must be strictly before `today`
pub fn validate_date_of_birth(date_of_birth: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date_of_birth >= today {
        return Err(ValidationError::DateOfBirthNotInPast);
    }
    Ok(())
}

pub fn validate_duration(duration_seconds: i32) -> Result<(), ValidationError> {
    if duration_seconds <= 0 {
        return Err(ValidationError::NonPositiveDuration);
    }
    Ok(())
}
