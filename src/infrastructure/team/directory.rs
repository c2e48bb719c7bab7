//! Team directory for team and association management

use std::sync::Arc;

use tracing::info;

use crate::domain::auth::AssociationChange;
use crate::domain::identity::IdentityId;
use crate::domain::resource::ResourceId;
use crate::domain::team::{Team, TeamId, TeamStore};
use crate::domain::DomainError;

/// Request for creating a new team
#[derive(Debug, Clone)]
pub struct CreateTeamRequest {
    pub name: String,
}

/// Request for updating a team
#[derive(Debug, Clone)]
pub struct UpdateTeamRequest {
    pub name: String,
}

/// Team directory for managing teams and their association edges.
///
/// Every mutation of an association edge returns the [`AssociationChange`]
/// describing it, so the caller can hand the event to the grant
/// synchronizer. The directory itself never touches the authorization
/// cache.
#[derive(Debug)]
pub struct TeamDirectory<S: TeamStore> {
    store: Arc<S>,
}

impl<S: TeamStore> TeamDirectory<S> {
    /// Create a new team directory
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// List all teams
    pub async fn list(&self) -> Result<Vec<Team>, DomainError> {
        self.store.list().await
    }

    /// Get a team by ID
    pub async fn get(&self, id: &str) -> Result<Option<Team>, DomainError> {
        let team_id = TeamId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.store.get(&team_id).await
    }

    /// Create a new team with a generated ID
    pub async fn create(&self, request: CreateTeamRequest) -> Result<Team, DomainError> {
        info!(name = %request.name, "Creating team");

        let team = Team::new(TeamId::generate(), &request.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        self.store.create(team).await
    }

    /// Rename a team
    pub async fn update(&self, id: &str, request: UpdateTeamRequest) -> Result<Team, DomainError> {
        info!(id = %id, "Updating team");

        let team_id = TeamId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        let mut team = self
            .store
            .get(&team_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", id)))?;

        team.set_name(&request.name)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        self.store.update(team).await
    }

    /// Delete a team.
    ///
    /// Both of the team's edge sets collapse with it, so the returned
    /// change carries no single identity.
    pub async fn delete(&self, id: &str) -> Result<AssociationChange, DomainError> {
        info!(id = %id, "Deleting team");

        let team_id = TeamId::new(id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        if !self.store.delete(&team_id).await? {
            return Err(DomainError::not_found(format!("Team '{}' not found", id)));
        }

        Ok(AssociationChange::membership_collapsed(team_id))
    }

    /// List the IDs of a team's members
    pub async fn list_members(&self, team_id: &str) -> Result<Vec<IdentityId>, DomainError> {
        let team_id = TeamId::new(team_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.store.list_member_identity_ids(&team_id).await
    }

    /// Add an identity to a team
    pub async fn add_member(
        &self,
        identity_id: &str,
        team_id: &str,
    ) -> Result<AssociationChange, DomainError> {
        info!(identity = %identity_id, team = %team_id, "Adding team member");

        let identity_id =
            IdentityId::new(identity_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        let team_id = TeamId::new(team_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        self.store.add_identity_to_team(&identity_id, &team_id).await?;

        Ok(AssociationChange::membership_added(identity_id, team_id))
    }

    /// Remove an identity from a team.
    ///
    /// Succeeds even when the identity was not a member; the edge set is
    /// simply unchanged in that case.
    pub async fn remove_member(
        &self,
        identity_id: &str,
        team_id: &str,
    ) -> Result<AssociationChange, DomainError> {
        info!(identity = %identity_id, team = %team_id, "Removing team member");

        let identity_id =
            IdentityId::new(identity_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        let team_id = TeamId::new(team_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        self.store
            .remove_identity_from_team(&identity_id, &team_id)
            .await?;

        Ok(AssociationChange::membership_removed(identity_id, team_id))
    }

    /// List the IDs of the resources granted to a team
    pub async fn list_grants(&self, team_id: &str) -> Result<Vec<ResourceId>, DomainError> {
        let team_id = TeamId::new(team_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        self.store.list_granted_resource_ids(&team_id).await
    }

    /// Grant a resource to a team
    pub async fn add_grant(
        &self,
        resource_id: &str,
        team_id: &str,
    ) -> Result<AssociationChange, DomainError> {
        info!(resource = %resource_id, team = %team_id, "Granting resource to team");

        let resource_id =
            ResourceId::new(resource_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        let team_id = TeamId::new(team_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        self.store.grant_resource_to_team(&resource_id, &team_id).await?;

        Ok(AssociationChange::grant_added(resource_id, team_id))
    }

    /// Revoke a resource grant from a team.
    ///
    /// Succeeds even when no such grant existed.
    pub async fn remove_grant(
        &self,
        resource_id: &str,
        team_id: &str,
    ) -> Result<AssociationChange, DomainError> {
        info!(resource = %resource_id, team = %team_id, "Revoking resource from team");

        let resource_id =
            ResourceId::new(resource_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;
        let team_id = TeamId::new(team_id).map_err(|e| DomainError::invalid_id(e.to_string()))?;

        self.store
            .revoke_resource_from_team(&resource_id, &team_id)
            .await?;

        Ok(AssociationChange::grant_removed(resource_id, team_id))
    }
}
