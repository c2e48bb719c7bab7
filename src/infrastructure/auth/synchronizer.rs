//! Grant synchronizer
//!
//! Watches association changes and keeps the authorization snapshot and
//! the visible resource scope in step with them. Only changes that can
//! affect the current identity trigger a refresh; everything else is
//! reported as not affecting it.

use std::sync::Arc;

use tracing::{debug, info};

use super::cache::AuthorizationCache;
use super::reload::ReloadNotifier;
use crate::domain::auth::{AssociationChange, AuthorizationState, SessionStore};
use crate::domain::resource::ResourceStore;
use crate::domain::DomainError;
use crate::infrastructure::resource::ResourceDirectory;

/// Outcome of handing an association change to the synchronizer
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The change affected the current identity; the snapshot was
    /// refreshed and views were asked to reload
    Refreshed(AuthorizationState),
    /// The change did not touch the current identity's authorization
    NotAffected,
}

/// Keeps the authorization cache and the visible resource scope in sync
/// with association changes.
///
/// The sequence on an affecting change is fixed: refresh the snapshot,
/// rescope the visible resources, then request a view reload. A failure
/// at any step leaves the later steps undone; the association mutation
/// that produced the change has already been applied and stands either
/// way, so the caller must surface the error as a stale-state warning.
#[derive(Debug)]
pub struct GrantSynchronizer<B: SessionStore + ResourceStore> {
    cache: Arc<AuthorizationCache<B>>,
    resources: Arc<ResourceDirectory<B>>,
    reload: ReloadNotifier,
}

impl<B: SessionStore + ResourceStore> GrantSynchronizer<B> {
    /// Create a new grant synchronizer
    pub fn new(
        cache: Arc<AuthorizationCache<B>>,
        resources: Arc<ResourceDirectory<B>>,
        reload: ReloadNotifier,
    ) -> Self {
        Self {
            cache,
            resources,
            reload,
        }
    }

    /// Whether an association change can alter what the given snapshot
    /// authorizes.
    ///
    /// A membership change matters when it names the current identity,
    /// or names no identity (a collapsed team) while the snapshot has
    /// the team as a member team. A grant change matters when it touches
    /// a member team.
    pub fn requires_refresh(change: &AssociationChange, state: &AuthorizationState) -> bool {
        match change {
            AssociationChange::Membership {
                identity: Some(identity),
                ..
            } => state.identity_id() == Some(identity),
            AssociationChange::Membership {
                identity: None,
                team,
                ..
            } => state.is_member_of(team),
            AssociationChange::Grant { team, .. } => state.is_member_of(team),
        }
    }

    /// React to an applied association change.
    ///
    /// With no snapshot yet there is nothing the change could be
    /// compared against, so it is reported as not affecting anything.
    pub async fn synchronize(
        &self,
        change: &AssociationChange,
    ) -> Result<SyncOutcome, DomainError> {
        let Some(state) = self.cache.snapshot().await else {
            debug!(change = %change, "No authorization snapshot yet; nothing to synchronize");
            return Ok(SyncOutcome::NotAffected);
        };

        if !Self::requires_refresh(change, &state) {
            debug!(change = %change, "Association change does not affect the current identity");
            return Ok(SyncOutcome::NotAffected);
        }

        info!(change = %change, "Association change affects the current identity; refreshing");

        let refreshed = self.refresh_and_rescope().await?;

        Ok(SyncOutcome::Refreshed(refreshed))
    }

    /// Run the full refresh sequence after a session transition
    pub async fn after_sign_in(&self) -> Result<AuthorizationState, DomainError> {
        info!("Synchronizing authorization after sign-in");
        self.refresh_and_rescope().await
    }

    async fn refresh_and_rescope(&self) -> Result<AuthorizationState, DomainError> {
        let state = self.cache.refresh().await?;

        // Same visibility rule as startup: administrators and open
        // deployments see the whole directory, everyone else exactly
        // their granted scope
        if state.is_grant_scoped() {
            self.resources.rescope(state.granted_resources()).await?;
        } else {
            self.resources.load_all().await?;
        }

        self.reload.request_reload();

        Ok(state)
    }
}
