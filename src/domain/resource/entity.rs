//! Resource entity and related types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{
    validate_field_name, validate_resource_id, validate_resource_name, ResourceValidationError,
};

/// Resource identifier - alphanumeric + hyphens, max 50 characters,
/// normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId(String);

impl ResourceId {
    /// Create a new ResourceId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ResourceValidationError> {
        let id = id.into();
        validate_resource_id(&id)?;
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

impl TryFrom<String> for ResourceId {
    type Error = ResourceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Suggested field identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SuggestedFieldId(String);

impl SuggestedFieldId {
    /// Create a new SuggestedFieldId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, ResourceValidationError> {
        let id = id.into();
        validate_resource_id(&id)?;
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

impl TryFrom<String> for SuggestedFieldId {
    type Error = ResourceValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SuggestedFieldId> for String {
    fn from(id: SuggestedFieldId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SuggestedFieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An indexed collection: the unit of access control.
///
/// Everything beyond identity is descriptive. Rule management cares
/// about the fields; the access-control core only cares about the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Unique identifier
    id: ResourceId,
    /// Display name
    name: String,
    /// Free-form description
    #[serde(skip_serializing_if = "Option::is_none", default)]
    description: Option<String>,
}

impl Resource {
    /// Create a new resource
    pub fn new(id: ResourceId, name: impl Into<String>) -> Result<Self, ResourceValidationError> {
        let name = name.into();
        validate_resource_name(&name)?;

        Ok(Self {
            id,
            name,
            description: None,
        })
    }

    /// Set the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A named field of a resource that rule authors may target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedField {
    /// Unique identifier within the resource
    id: SuggestedFieldId,
    /// Field name as known to the index
    name: String,
}

impl SuggestedField {
    /// Create a new suggested field
    pub fn new(
        id: SuggestedFieldId,
        name: impl Into<String>,
    ) -> Result<Self, ResourceValidationError> {
        let name = name.into();
        validate_field_name(&name)?;

        Ok(Self { id, name })
    }

    pub fn id(&self) -> &SuggestedFieldId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
