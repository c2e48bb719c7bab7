//! In-memory backend
//!
//! A complete in-process implementation of every store trait. Used for
//! tests and demos, and doubles as the executable model of the grant
//! invariant: the snapshot it serves is always the union, over the
//! session's member teams, of each team's grant edge.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::edges::AssociationTable;
use crate::domain::auth::{AuthorizationState, SessionStore};
use crate::domain::identity::{Identity, IdentityFilter, IdentityId, IdentityStore};
use crate::domain::resource::{Resource, ResourceId, ResourceStore, SuggestedField, SuggestedFieldId};
use crate::domain::team::{Team, TeamId, TeamStore};
use crate::domain::DomainError;

/// In-memory implementation of the console's backing store.
///
/// Credentials are held verbatim; hashing belongs to the real server,
/// and this backend never leaves the process.
#[derive(Debug)]
pub struct InMemoryBackend {
    identities: RwLock<HashMap<IdentityId, Identity>>,
    /// Index for email -> identity id lookup
    email_index: RwLock<HashMap<String, IdentityId>>,
    credentials: RwLock<HashMap<IdentityId, String>>,
    teams: RwLock<HashMap<TeamId, Team>>,
    resources: RwLock<HashMap<ResourceId, Resource>>,
    suggested_fields: RwLock<HashMap<ResourceId, Vec<SuggestedField>>>,
    /// Team-identity edge
    memberships: AssociationTable<TeamId, IdentityId>,
    /// Team-resource edge
    grants: AssociationTable<TeamId, ResourceId>,
    session: RwLock<Option<IdentityId>>,
    sign_in_required: bool,
    unavailable: AtomicBool,
}

impl InMemoryBackend {
    /// Create an empty backend that requires sign-in
    pub fn new() -> Self {
        Self {
            identities: RwLock::new(HashMap::new()),
            email_index: RwLock::new(HashMap::new()),
            credentials: RwLock::new(HashMap::new()),
            teams: RwLock::new(HashMap::new()),
            resources: RwLock::new(HashMap::new()),
            suggested_fields: RwLock::new(HashMap::new()),
            memberships: AssociationTable::new(),
            grants: AssociationTable::new(),
            session: RwLock::new(None),
            sign_in_required: true,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Override the deployment sign-in policy (builder pattern)
    pub fn with_sign_in_required(mut self, sign_in_required: bool) -> Self {
        self.sign_in_required = sign_in_required;
        self
    }

    /// Simulate the backing store becoming unreachable (or reachable
    /// again). While unavailable, every store operation fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::unavailable("Backing store is unreachable"));
        }
        Ok(())
    }

    async fn team_exists(&self, team: &TeamId) -> Result<(), DomainError> {
        let teams = self.teams.read().await;

        if !teams.contains_key(team) {
            return Err(DomainError::not_found(format!("Team '{}' not found", team)));
        }
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityStore for InMemoryBackend {
    async fn list(&self, filter: &IdentityFilter) -> Result<Vec<Identity>, DomainError> {
        self.ensure_available()?;
        let identities = self.identities.read().await;

        let mut result: Vec<Identity> = identities
            .values()
            .filter(|identity| filter.matches(identity.id()))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(result)
    }

    async fn get(&self, id: &IdentityId) -> Result<Option<Identity>, DomainError> {
        self.ensure_available()?;
        let identities = self.identities.read().await;
        Ok(identities.get(id).cloned())
    }

    async fn lookup_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError> {
        self.ensure_available()?;

        // One lock at a time; mutators take these in the opposite order
        let id = {
            let email_index = self.email_index.read().await;
            email_index.get(&email.to_lowercase()).cloned()
        };
        let Some(id) = id else {
            return Ok(None);
        };

        let identities = self.identities.read().await;
        Ok(identities.get(&id).cloned())
    }

    async fn create(&self, identity: Identity, credential: &str) -> Result<Identity, DomainError> {
        self.ensure_available()?;
        let mut identities = self.identities.write().await;
        let mut email_index = self.email_index.write().await;

        if identities.contains_key(identity.id()) {
            return Err(DomainError::conflict(format!(
                "Identity with ID '{}' already exists",
                identity.id()
            )));
        }

        let email = identity.email().to_lowercase();

        if email_index.contains_key(&email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                identity.email()
            )));
        }

        email_index.insert(email, identity.id().clone());
        self.credentials
            .write()
            .await
            .insert(identity.id().clone(), credential.to_string());
        identities.insert(identity.id().clone(), identity.clone());

        Ok(identity)
    }

    async fn update(
        &self,
        identity: Identity,
        credential: Option<&str>,
    ) -> Result<Identity, DomainError> {
        self.ensure_available()?;
        let mut identities = self.identities.write().await;
        let mut email_index = self.email_index.write().await;

        let Some(existing) = identities.get(identity.id()) else {
            return Err(DomainError::not_found(format!(
                "Identity '{}' not found",
                identity.id()
            )));
        };

        let old_email = existing.email().to_lowercase();
        let new_email = identity.email().to_lowercase();

        if old_email != new_email {
            if email_index.contains_key(&new_email) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' is already registered",
                    identity.email()
                )));
            }

            email_index.remove(&old_email);
            email_index.insert(new_email, identity.id().clone());
        }

        if let Some(credential) = credential {
            self.credentials
                .write()
                .await
                .insert(identity.id().clone(), credential.to_string());
        }

        identities.insert(identity.id().clone(), identity.clone());

        Ok(identity)
    }

    async fn delete(&self, id: &IdentityId) -> Result<bool, DomainError> {
        self.ensure_available()?;
        let mut identities = self.identities.write().await;
        let mut email_index = self.email_index.write().await;

        let Some(identity) = identities.remove(id) else {
            return Ok(false);
        };

        email_index.remove(&identity.email().to_lowercase());
        self.credentials.write().await.remove(id);
        self.memberships.remove_right(id)?;

        // A deleted identity cannot keep a session
        let mut session = self.session.write().await;
        if session.as_ref() == Some(id) {
            *session = None;
        }

        Ok(true)
    }

    async fn sign_in(&self, email: &str, credential: &str) -> Result<Identity, DomainError> {
        self.ensure_available()?;

        let identity = self
            .lookup_by_email(email)
            .await?
            .ok_or_else(|| DomainError::unauthorized("Invalid email or password"))?;

        let credentials = self.credentials.read().await;
        let known = credentials.get(identity.id());

        if known.map(String::as_str) != Some(credential) {
            return Err(DomainError::unauthorized("Invalid email or password"));
        }

        *self.session.write().await = Some(identity.id().clone());

        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), DomainError> {
        self.ensure_available()?;
        *self.session.write().await = None;
        Ok(())
    }
}

#[async_trait]
impl TeamStore for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Team>, DomainError> {
        self.ensure_available()?;
        let teams = self.teams.read().await;

        let mut result: Vec<Team> = teams.values().cloned().collect();
        result.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(result)
    }

    async fn get(&self, id: &TeamId) -> Result<Option<Team>, DomainError> {
        self.ensure_available()?;
        let teams = self.teams.read().await;
        Ok(teams.get(id).cloned())
    }

    async fn create(&self, team: Team) -> Result<Team, DomainError> {
        self.ensure_available()?;
        let mut teams = self.teams.write().await;

        if teams.contains_key(team.id()) {
            return Err(DomainError::conflict(format!(
                "Team with ID '{}' already exists",
                team.id()
            )));
        }

        teams.insert(team.id().clone(), team.clone());
        Ok(team)
    }

    async fn update(&self, team: Team) -> Result<Team, DomainError> {
        self.ensure_available()?;
        let mut teams = self.teams.write().await;

        if !teams.contains_key(team.id()) {
            return Err(DomainError::not_found(format!(
                "Team '{}' not found",
                team.id()
            )));
        }

        teams.insert(team.id().clone(), team.clone());
        Ok(team)
    }

    async fn delete(&self, id: &TeamId) -> Result<bool, DomainError> {
        self.ensure_available()?;
        let mut teams = self.teams.write().await;

        if teams.remove(id).is_none() {
            return Ok(false);
        }

        // Both edges collapse with the team
        self.memberships.remove_left(id)?;
        self.grants.remove_left(id)?;

        Ok(true)
    }

    async fn list_member_identity_ids(
        &self,
        team: &TeamId,
    ) -> Result<Vec<IdentityId>, DomainError> {
        self.ensure_available()?;
        self.team_exists(team).await?;
        self.memberships.list(team)
    }

    async fn add_identity_to_team(
        &self,
        identity: &IdentityId,
        team: &TeamId,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        self.team_exists(team).await?;

        if !self.identities.read().await.contains_key(identity) {
            return Err(DomainError::not_found(format!(
                "Identity '{}' not found",
                identity
            )));
        }

        if !self.memberships.link(team, identity)? {
            return Err(DomainError::conflict(format!(
                "Identity '{}' is already a member of team '{}'",
                identity, team
            )));
        }

        Ok(())
    }

    async fn remove_identity_from_team(
        &self,
        identity: &IdentityId,
        team: &TeamId,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        self.team_exists(team).await?;

        // Removing a non-member is a no-op success
        self.memberships.unlink(team, identity)?;

        Ok(())
    }

    async fn list_granted_resource_ids(
        &self,
        team: &TeamId,
    ) -> Result<Vec<ResourceId>, DomainError> {
        self.ensure_available()?;
        self.team_exists(team).await?;
        self.grants.list(team)
    }

    async fn grant_resource_to_team(
        &self,
        resource: &ResourceId,
        team: &TeamId,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        self.team_exists(team).await?;

        if !self.resources.read().await.contains_key(resource) {
            return Err(DomainError::not_found(format!(
                "Resource '{}' not found",
                resource
            )));
        }

        if !self.grants.link(team, resource)? {
            return Err(DomainError::conflict(format!(
                "Resource '{}' is already granted to team '{}'",
                resource, team
            )));
        }

        Ok(())
    }

    async fn revoke_resource_from_team(
        &self,
        resource: &ResourceId,
        team: &TeamId,
    ) -> Result<(), DomainError> {
        self.ensure_available()?;
        self.team_exists(team).await?;

        // Revoking an absent grant is a no-op success
        self.grants.unlink(team, resource)?;

        Ok(())
    }
}

#[async_trait]
impl ResourceStore for InMemoryBackend {
    async fn list(&self) -> Result<Vec<Resource>, DomainError> {
        self.ensure_available()?;
        let resources = self.resources.read().await;

        let mut result: Vec<Resource> = resources.values().cloned().collect();
        result.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(result)
    }

    async fn get(&self, id: &ResourceId) -> Result<Option<Resource>, DomainError> {
        self.ensure_available()?;
        let resources = self.resources.read().await;
        Ok(resources.get(id).cloned())
    }

    async fn create(&self, resource: Resource) -> Result<Resource, DomainError> {
        self.ensure_available()?;
        let mut resources = self.resources.write().await;

        if resources.contains_key(resource.id()) {
            return Err(DomainError::conflict(format!(
                "Resource with ID '{}' already exists",
                resource.id()
            )));
        }

        resources.insert(resource.id().clone(), resource.clone());
        Ok(resource)
    }

    async fn update(&self, resource: Resource) -> Result<Resource, DomainError> {
        self.ensure_available()?;
        let mut resources = self.resources.write().await;

        if !resources.contains_key(resource.id()) {
            return Err(DomainError::not_found(format!(
                "Resource '{}' not found",
                resource.id()
            )));
        }

        resources.insert(resource.id().clone(), resource.clone());
        Ok(resource)
    }

    async fn delete(&self, id: &ResourceId) -> Result<bool, DomainError> {
        self.ensure_available()?;
        let mut resources = self.resources.write().await;

        if resources.remove(id).is_none() {
            return Ok(false);
        }

        self.grants.remove_right(id)?;
        self.suggested_fields.write().await.remove(id);

        Ok(true)
    }

    async fn list_suggested_fields(
        &self,
        resource: &ResourceId,
    ) -> Result<Vec<SuggestedField>, DomainError> {
        self.ensure_available()?;

        if !self.resources.read().await.contains_key(resource) {
            return Err(DomainError::not_found(format!(
                "Resource '{}' not found",
                resource
            )));
        }

        let fields = self.suggested_fields.read().await;
        let mut result = fields.get(resource).cloned().unwrap_or_default();
        result.sort_by(|a, b| a.name().cmp(b.name()));

        Ok(result)
    }

    async fn add_suggested_field(
        &self,
        resource: &ResourceId,
        field: SuggestedField,
    ) -> Result<SuggestedField, DomainError> {
        self.ensure_available()?;

        if !self.resources.read().await.contains_key(resource) {
            return Err(DomainError::not_found(format!(
                "Resource '{}' not found",
                resource
            )));
        }

        let mut fields = self.suggested_fields.write().await;
        let entry = fields.entry(resource.clone()).or_default();

        if entry.iter().any(|f| f.name() == field.name()) {
            return Err(DomainError::conflict(format!(
                "Field '{}' is already suggested for resource '{}'",
                field.name(),
                resource
            )));
        }

        entry.push(field.clone());
        Ok(field)
    }

    async fn remove_suggested_field(
        &self,
        resource: &ResourceId,
        field: &SuggestedFieldId,
    ) -> Result<bool, DomainError> {
        self.ensure_available()?;

        if !self.resources.read().await.contains_key(resource) {
            return Err(DomainError::not_found(format!(
                "Resource '{}' not found",
                resource
            )));
        }

        let mut fields = self.suggested_fields.write().await;
        let Some(entry) = fields.get_mut(resource) else {
            return Ok(false);
        };

        let before = entry.len();
        entry.retain(|f| f.id() != field);

        Ok(entry.len() != before)
    }
}

#[async_trait]
impl SessionStore for InMemoryBackend {
    async fn fetch_auth_snapshot(&self) -> Result<AuthorizationState, DomainError> {
        self.ensure_available()?;

        let session = self.session.read().await;

        let Some(id) = session.as_ref() else {
            return Ok(AuthorizationState::anonymous(self.sign_in_required));
        };

        let identities = self.identities.read().await;
        let Some(identity) = identities.get(id).cloned() else {
            return Ok(AuthorizationState::anonymous(self.sign_in_required));
        };

        let member_teams: HashSet<TeamId> =
            self.memberships.list_reverse(id)?.into_iter().collect();

        let mut granted_resources: HashSet<ResourceId> = HashSet::new();
        for team in &member_teams {
            granted_resources.extend(self.grants.list(team)?);
        }

        Ok(
            AuthorizationState::authenticated(identity, member_teams, granted_resources)
                .with_sign_in_required(self.sign_in_required),
        )
    }
}
