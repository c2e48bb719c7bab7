//! Authorization cache
//!
//! Holds the most recently fetched authorization snapshot and answers
//! every access-control question from it. Uninitialized or failed
//! state always reads as the least privileged answer.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::domain::auth::{AuthorizationState, SessionStore};
use crate::domain::identity::Identity;
use crate::domain::resource::ResourceId;
use crate::domain::team::TeamId;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct CachedSnapshot {
    state: AuthorizationState,
    refreshed_at: DateTime<Utc>,
}

/// Cache over the session's authorization snapshot.
///
/// A refresh replaces the snapshot wholesale; a failed refresh keeps
/// the previous snapshot so the console can keep operating on stale
/// state while the backing store is unreachable.
#[derive(Debug)]
pub struct AuthorizationCache<S: SessionStore> {
    store: Arc<S>,
    snapshot: RwLock<Option<CachedSnapshot>>,
    refresh_lock: Mutex<()>,
}

impl<S: SessionStore> AuthorizationCache<S> {
    /// Create an uninitialized cache
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Fetch a fresh snapshot and replace the cached one.
    ///
    /// Refreshes are serialized; concurrent callers each take their
    /// turn. On failure the cached snapshot is left untouched and the
    /// error is returned.
    pub async fn refresh(&self) -> Result<AuthorizationState, DomainError> {
        let _guard = self.refresh_lock.lock().await;

        debug!("Refreshing authorization snapshot");

        let state = match self.store.fetch_auth_snapshot().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Authorization refresh failed; keeping previous snapshot");
                return Err(e);
            }
        };

        *self.snapshot.write().await = Some(CachedSnapshot {
            state: state.clone(),
            refreshed_at: Utc::now(),
        });

        info!(
            signed_in = state.is_signed_in(),
            administrator = state.is_administrator(),
            member_teams = state.member_teams().len(),
            granted_resources = state.granted_resources().len(),
            "Authorization snapshot refreshed"
        );

        Ok(state)
    }

    /// The cached snapshot, if one has been fetched
    pub async fn snapshot(&self) -> Option<AuthorizationState> {
        self.snapshot.read().await.as_ref().map(|c| c.state.clone())
    }

    /// When the snapshot was last successfully refreshed
    pub async fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.as_ref().map(|c| c.refreshed_at)
    }

    /// The signed-in identity, if any
    pub async fn current_identity(&self) -> Option<Identity> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .and_then(|c| c.state.current_identity().cloned())
    }

    /// The teams the current identity belongs to
    pub async fn member_team_ids(&self) -> HashSet<TeamId> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map(|c| c.state.member_teams().clone())
            .unwrap_or_default()
    }

    /// The resources reachable through the member teams
    pub async fn granted_resource_ids(&self) -> HashSet<ResourceId> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map(|c| c.state.granted_resources().clone())
            .unwrap_or_default()
    }

    /// Whether sign-in is required by the deployment.
    ///
    /// Reads as required until a snapshot says otherwise.
    pub async fn is_sign_in_required(&self) -> bool {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map(|c| c.state.is_sign_in_required())
            .unwrap_or(true)
    }

    /// Whether a session is established
    pub async fn is_signed_in(&self) -> bool {
        self.snapshot
            .read()
            .await
            .as_ref()
            .is_some_and(|c| c.state.is_signed_in())
    }

    /// Whether the current identity is an administrator
    pub async fn is_administrator(&self) -> bool {
        self.snapshot
            .read()
            .await
            .as_ref()
            .is_some_and(|c| c.state.is_administrator())
    }

    /// Whether the current identity must change its password
    pub async fn is_password_change_required(&self) -> bool {
        self.snapshot
            .read()
            .await
            .as_ref()
            .is_some_and(|c| c.state.is_password_change_required())
    }

    /// Whether the current identity belongs to the team
    pub async fn is_member_of(&self, team: &TeamId) -> bool {
        self.snapshot
            .read()
            .await
            .as_ref()
            .is_some_and(|c| c.state.is_member_of(team))
    }

    /// Whether the current identity holds a grant for the resource
    pub async fn has_grant(&self, resource: &ResourceId) -> bool {
        self.snapshot
            .read()
            .await
            .as_ref()
            .is_some_and(|c| c.state.has_grant(resource))
    }
}
