//! Identity entity and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{
    validate_email, validate_identity_id, validate_identity_name, IdentityValidationError,
};

/// Identity identifier - alphanumeric + hyphens, max 50 characters.
///
/// Identifiers are normalized to lowercase so route- and wire-supplied
/// ids compare equal regardless of casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityId(String);

impl IdentityId {
    /// Create a new IdentityId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, IdentityValidationError> {
        let id = id.into();
        validate_identity_id(&id)?;
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Mint a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IdentityId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IdentityId> for String {
    fn from(id: IdentityId) -> Self {
        id.0
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity entity.
///
/// The credential is write-only on this side of the wire: it travels in
/// create/update requests and is never part of the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Unique identifier
    id: IdentityId,
    /// Display name
    name: String,
    /// Email address, unique within the directory
    email: String,
    /// Whether this identity may use administrator screens
    is_administrator: bool,
    /// Whether the identity must change its password before continuing
    must_change_password: bool,
}

impl Identity {
    /// Create a new identity
    pub fn new(
        id: IdentityId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, IdentityValidationError> {
        let name = name.into();
        let email = email.into();
        validate_identity_name(&name)?;
        validate_email(&email)?;

        Ok(Self {
            id,
            name,
            email: email.to_lowercase(),
            is_administrator: false,
            must_change_password: false,
        })
    }

    /// Set the administrator flag (builder pattern)
    pub fn with_administrator(mut self, is_administrator: bool) -> Self {
        self.is_administrator = is_administrator;
        self
    }

    /// Set the forced password change flag (builder pattern)
    pub fn with_must_change_password(mut self, must_change_password: bool) -> Self {
        self.must_change_password = must_change_password;
        self
    }

    // Getters

    pub fn id(&self) -> &IdentityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_administrator(&self) -> bool {
        self.is_administrator
    }

    pub fn must_change_password(&self) -> bool {
        self.must_change_password
    }

    // Mutators

    /// Update the display name
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), IdentityValidationError> {
        let name = name.into();
        validate_identity_name(&name)?;
        self.name = name;
        Ok(())
    }

    /// Update the email address
    pub fn set_email(&mut self, email: impl Into<String>) -> Result<(), IdentityValidationError> {
        let email = email.into();
        validate_email(&email)?;
        self.email = email.to_lowercase();
        Ok(())
    }

    /// Grant or revoke administrator access
    pub fn set_administrator(&mut self, is_administrator: bool) {
        self.is_administrator = is_administrator;
    }

    /// Require or clear a forced password change
    pub fn set_must_change_password(&mut self, must_change_password: bool) {
        self.must_change_password = must_change_password;
    }
}
