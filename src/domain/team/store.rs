//! Team store trait

use async_trait::async_trait;

use super::entity::{Team, TeamId};
use crate::domain::identity::IdentityId;
use crate::domain::resource::ResourceId;
use crate::domain::DomainError;

/// Store for teams and the two association edges they own.
///
/// Edge mutators change exactly one edge and never touch cached
/// authorization state; synchronization is the caller's concern.
/// Removals are idempotent on absence, additions of an existing edge
/// fail with a conflict, and every edge operation fails with NotFound
/// when the team (or the referenced identity/resource) does not exist.
#[async_trait]
pub trait TeamStore: Send + Sync + std::fmt::Debug {
    /// List all teams
    async fn list(&self) -> Result<Vec<Team>, DomainError>;

    /// Get a team by ID
    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError>;

    /// Create a new team
    async fn create(&self, team: Team) -> Result<Team, DomainError>;

    /// Update an existing team
    async fn update(&self, team: Team) -> Result<Team, DomainError>;

    /// Delete a team by ID, collapsing both of its edges
    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError>;

    /// List the identity ids belonging to a team, in stable order
    async fn list_member_identity_ids(
        &self,
        team: &TeamId,
    ) -> Result<Vec<IdentityId>, DomainError>;

    /// Add an identity to a team's membership edge
    async fn add_identity_to_team(
        &self,
        identity: &IdentityId,
        team: &TeamId,
    ) -> Result<(), DomainError>;

    /// Remove an identity from a team's membership edge (no-op if absent)
    async fn remove_identity_from_team(
        &self,
        identity: &IdentityId,
        team: &TeamId,
    ) -> Result<(), DomainError>;

    /// List the resource ids granted to a team, in stable order
    async fn list_granted_resource_ids(
        &self,
        team: &TeamId,
    ) -> Result<Vec<ResourceId>, DomainError>;

    /// Grant a resource to a team
    async fn grant_resource_to_team(
        &self,
        resource: &ResourceId,
        team: &TeamId,
    ) -> Result<(), DomainError>;

    /// Revoke a resource from a team (no-op if not granted)
    async fn revoke_resource_from_team(
        &self,
        resource: &ResourceId,
        team: &TeamId,
    ) -> Result<(), DomainError>;
}
