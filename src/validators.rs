/// Input validators - every request body passes through here before it
/// reaches a service.
/// Features:
/// 1. DoS Protection: Input length limits
/// 2. Format checks: NIM, admin username, birth date
/// 3. Control-character rejection for free-text fields

use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MIN_NIM_LENGTH: usize = 8;
const MAX_NIM_LENGTH: usize = 16;
const MIN_NAME_LENGTH: usize = 1;
const MAX_NAME_LENGTH: usize = 256;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 64;
const MAX_CONTACT_LENGTH: usize = 512;
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// bcrypt only looks at the first 72 bytes
pub const MAX_PASSWORD_LENGTH: usize = 72;

lazy_static! {
    static ref NIM_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.-]+$").unwrap();
}

/// Validates a student number (NIM)
/// - 8 to 16 characters
/// - ASCII letters and digits only
pub fn is_valid_nim(nim: &str) -> Result<String, ValidationError> {
    let trimmed = nim.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("nim".to_string()));
    }

    if trimmed.len() < MIN_NIM_LENGTH {
        return Err(ValidationError::TooShort("nim".to_string(), MIN_NIM_LENGTH));
    }

    if trimmed.len() > MAX_NIM_LENGTH {
        return Err(ValidationError::TooLong("nim".to_string(), MAX_NIM_LENGTH));
    }

    if !NIM_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("nim".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a display name
/// - Checks length constraints
/// - Rejects control characters
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("name".to_string()));
    }

    if trimmed.chars().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort("name".to_string(), MIN_NAME_LENGTH));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("name".to_string(), MAX_NAME_LENGTH));
    }

    if has_control_characters(trimmed) {
        return Err(ValidationError::SuspiciousContent("name".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates an admin username
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }

    if trimmed.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort("username".to_string(), MIN_USERNAME_LENGTH));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username".to_string(), MAX_USERNAME_LENGTH));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username".to_string()));
    }

    Ok(trimmed.to_string())
}

/// Validates a new password. Whitespace is significant, so nothing is trimmed.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()));
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("password".to_string(), MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong("password".to_string(), MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Login fields only need to be present; their content is checked by the
/// credential lookup itself.
pub fn is_present(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Parses a birth date given as `YYYY-MM-DD` or as a full RFC 3339 timestamp.
pub fn parse_dob(dob: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = dob.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("dob".to_string()));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::InvalidFormat("dob".to_string()))
}

/// Optional free-text contact field (phone, address, hobby).
/// Blank strings are stored as given; only length and control characters are checked.
pub fn is_valid_contact(field: &str, value: &str) -> Result<String, ValidationError> {
    if value.chars().count() > MAX_CONTACT_LENGTH {
        return Err(ValidationError::TooLong(field.to_string(), MAX_CONTACT_LENGTH));
    }

    if has_control_characters(value) {
        return Err(ValidationError::SuspiciousContent(field.to_string()));
    }

    Ok(value.trim().to_string())
}

fn has_control_characters(value: &str) -> bool {
    value.chars().any(|c| c.is_control())
}
