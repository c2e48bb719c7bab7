//! Resource store trait

use async_trait::async_trait;

use super::entity::{Resource, ResourceId, SuggestedField, SuggestedFieldId};
use crate::domain::DomainError;

/// Store for indexed collections and their suggested fields
#[async_trait]
pub trait ResourceStore: Send + Sync + std::fmt::Debug {
    /// List all resources
    async fn list(&self) -> Result<Vec<Resource>, DomainError>;

    /// Get a resource by ID
    async fn get(&self, id: &ResourceId) -> Result<Option<Resource>, DomainError>;

    /// Create a new resource
    async fn create(&self, resource: Resource) -> Result<Resource, DomainError>;

    /// Update an existing resource
    async fn update(&self, resource: Resource) -> Result<Resource, DomainError>;

    /// Delete a resource by ID
    async fn delete(&self, id: &ResourceId) -> Result<bool, DomainError>;

    /// List the suggested fields of a resource
    async fn list_suggested_fields(
        &self,
        resource: &ResourceId,
    ) -> Result<Vec<SuggestedField>, DomainError>;

    /// Add a suggested field to a resource
    async fn add_suggested_field(
        &self,
        resource: &ResourceId,
        field: SuggestedField,
    ) -> Result<SuggestedField, DomainError>;

    /// Remove a suggested field from a resource
    async fn remove_suggested_field(
        &self,
        resource: &ResourceId,
        field: &SuggestedFieldId,
    ) -> Result<bool, DomainError>;
}
