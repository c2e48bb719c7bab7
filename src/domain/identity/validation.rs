//! Identity validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during identity validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdentityValidationError {
    #[error("Identity ID cannot be empty")]
    EmptyId,

    #[error("Identity ID cannot exceed {0} characters")]
    IdTooLong(usize),

    #[error("Identity ID can only contain alphanumeric characters and hyphens")]
    InvalidIdCharacters,

    #[error("Identity ID cannot start or end with a hyphen")]
    InvalidIdFormat,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email cannot exceed {0} characters")]
    EmailTooLong(usize),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MAX_IDENTITY_ID_LENGTH: usize = 50;
const MAX_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 254;
const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// Regex pattern for a plausible email address (local@domain.tld)
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Validate an identity ID
pub fn validate_identity_id(id: &str) -> Result<(), IdentityValidationError> {
    if id.is_empty() {
        return Err(IdentityValidationError::EmptyId);
    }

    if id.len() > MAX_IDENTITY_ID_LENGTH {
        return Err(IdentityValidationError::IdTooLong(MAX_IDENTITY_ID_LENGTH));
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(IdentityValidationError::InvalidIdCharacters);
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(IdentityValidationError::InvalidIdFormat);
    }

    Ok(())
}

/// Validate a display name
pub fn validate_identity_name(name: &str) -> Result<(), IdentityValidationError> {
    if name.trim().is_empty() {
        return Err(IdentityValidationError::EmptyName);
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(IdentityValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), IdentityValidationError> {
    if email.is_empty() {
        return Err(IdentityValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(IdentityValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(IdentityValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - Minimum 8 characters
/// - Maximum 128 characters
pub fn validate_password(password: &str) -> Result<(), IdentityValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(IdentityValidationError::PasswordTooShort(
            MIN_PASSWORD_LENGTH,
        ));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(IdentityValidationError::PasswordTooLong(
            MAX_PASSWORD_LENGTH,
        ));
    }

    Ok(())
}
