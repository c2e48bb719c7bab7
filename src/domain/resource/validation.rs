//! Resource validation

use thiserror::Error;

/// Errors that can occur during resource validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResourceValidationError {
    #[error("Resource ID cannot be empty")]
    EmptyId,

    #[error("Resource ID cannot exceed {0} characters")]
    IdTooLong(usize),

    #[error("Resource ID can only contain alphanumeric characters and hyphens")]
    InvalidIdCharacters,

    #[error("Resource ID cannot start or end with a hyphen")]
    InvalidIdFormat,

    #[error("Resource name cannot be empty")]
    EmptyName,

    #[error("Resource name cannot exceed {0} characters")]
    NameTooLong(usize),

    #[error("Field name cannot be empty")]
    EmptyFieldName,

    #[error("Field name cannot exceed {0} characters")]
    FieldNameTooLong(usize),
}

const MAX_RESOURCE_ID_LENGTH: usize = 50;
const MAX_RESOURCE_NAME_LENGTH: usize = 100;
const MAX_FIELD_NAME_LENGTH: usize = 100;

/// Validate a resource ID
pub fn validate_resource_id(id: &str) -> Result<(), ResourceValidationError> {
    if id.is_empty() {
        return Err(ResourceValidationError::EmptyId);
    }

    if id.len() > MAX_RESOURCE_ID_LENGTH {
        return Err(ResourceValidationError::IdTooLong(MAX_RESOURCE_ID_LENGTH));
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ResourceValidationError::InvalidIdCharacters);
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(ResourceValidationError::InvalidIdFormat);
    }

    Ok(())
}

/// Validate a resource display name
pub fn validate_resource_name(name: &str) -> Result<(), ResourceValidationError> {
    if name.trim().is_empty() {
        return Err(ResourceValidationError::EmptyName);
    }

    if name.len() > MAX_RESOURCE_NAME_LENGTH {
        return Err(ResourceValidationError::NameTooLong(
            MAX_RESOURCE_NAME_LENGTH,
        ));
    }

    Ok(())
}

/// Validate a suggested field name.
///
/// Index field names are looser than ids (underscores and dots are
/// common in the wild), so only emptiness and length are checked.
pub fn validate_field_name(name: &str) -> Result<(), ResourceValidationError> {
    if name.trim().is_empty() {
        return Err(ResourceValidationError::EmptyFieldName);
    }

    if name.len() > MAX_FIELD_NAME_LENGTH {
        return Err(ResourceValidationError::FieldNameTooLong(
            MAX_FIELD_NAME_LENGTH,
        ));
    }

    Ok(())
}
