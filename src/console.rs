//! Console state - the wired services over a shared backend

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::auth::SessionStore;
use crate::domain::identity::IdentityStore;
use crate::domain::resource::ResourceStore;
use crate::domain::team::TeamStore;
use crate::domain::DomainError;
use crate::infrastructure::auth::{
    reload_channel, AuthorizationCache, GrantSynchronizer, ReloadWatcher,
};
use crate::infrastructure::identity::IdentityDirectory;
use crate::infrastructure::resource::ResourceDirectory;
use crate::infrastructure::team::TeamDirectory;

/// Console state containing the wired services over one shared backend.
///
/// Directories mutate, the authorization cache answers access questions,
/// and the synchronizer keeps the two consistent: hosts hand each
/// association change produced by a directory to the synchronizer and
/// watch the reload channel for teardown signals.
pub struct ConsoleState<B>
where
    B: IdentityStore + TeamStore + ResourceStore + SessionStore,
{
    pub identities: IdentityDirectory<B>,
    pub teams: TeamDirectory<B>,
    pub resources: Arc<ResourceDirectory<B>>,
    pub auth: Arc<AuthorizationCache<B>>,
    pub synchronizer: GrantSynchronizer<B>,
    reload: ReloadWatcher,
}

impl<B> ConsoleState<B>
where
    B: IdentityStore + TeamStore + ResourceStore + SessionStore,
{
    /// Wire all console services over the given backend
    pub fn new(backend: Arc<B>) -> Self {
        let auth = Arc::new(AuthorizationCache::new(backend.clone()));
        let resources = Arc::new(ResourceDirectory::new(backend.clone()));
        let (notifier, reload) = reload_channel();
        let synchronizer = GrantSynchronizer::new(auth.clone(), resources.clone(), notifier);

        Self {
            identities: IdentityDirectory::new(backend.clone()),
            teams: TeamDirectory::new(backend),
            resources,
            auth,
            synchronizer,
            reload,
        }
    }

    /// Fetch the first authorization snapshot and scope the visible
    /// resources to it.
    ///
    /// Administrators and open deployments get the full resource list;
    /// everyone else gets exactly their granted scope. A backend that
    /// rejects the session outright is the normal pre-login state, not
    /// a startup failure; every other failure is surfaced.
    pub async fn initialize(&self) -> Result<(), DomainError> {
        info!("Initializing console state");

        let state = match self.auth.refresh().await {
            Ok(state) => state,
            Err(DomainError::Unauthorized { .. }) => {
                debug!("Sign-in required and no session is established");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if !state.is_signed_in() {
            debug!("No session; leaving the resource scope empty");
            return Ok(());
        }

        if state.is_grant_scoped() {
            self.resources.rescope(state.granted_resources()).await?;
        } else {
            self.resources.load_all().await?;
        }

        Ok(())
    }

    /// A fresh subscription to the view-reload signal
    pub fn reload_watcher(&self) -> ReloadWatcher {
        self.reload.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::{BackendConfig, ConsoleConfig};
    use crate::create_console_state;
    use crate::domain::identity::{Identity, IdentityId};
    use crate::domain::resource::{Resource, ResourceId};
    use crate::domain::team::{Team, TeamId};
    use crate::infrastructure::auth::SyncOutcome;
    use crate::infrastructure::backend::InMemoryBackend;

    /// u1 member of t1; r1 granted to t1, r2 ungranted; nobody signed in
    async fn seeded_backend(administrator: bool) -> Arc<InMemoryBackend> {
        let backend = Arc::new(InMemoryBackend::new());

        let identity = Identity::new(
            IdentityId::new("u1").unwrap(),
            "User One",
            "u1@example.com",
        )
        .unwrap()
        .with_administrator(administrator);
        IdentityStore::create(backend.as_ref(), identity, "password-1")
            .await
            .unwrap();

        TeamStore::create(
            backend.as_ref(),
            Team::new(TeamId::new("t1").unwrap(), "Team One").unwrap(),
        )
        .await
        .unwrap();
        for (id, name) in [("r1", "Products"), ("r2", "Articles")] {
            ResourceStore::create(
                backend.as_ref(),
                Resource::new(ResourceId::new(id).unwrap(), name).unwrap(),
            )
            .await
            .unwrap();
        }

        backend
            .add_identity_to_team(&IdentityId::new("u1").unwrap(), &TeamId::new("t1").unwrap())
            .await
            .unwrap();
        backend
            .grant_resource_to_team(&ResourceId::new("r1").unwrap(), &TeamId::new("t1").unwrap())
            .await
            .unwrap();

        backend
    }

    #[tokio::test]
    async fn test_initialize_scopes_resources_to_member_grants() {
        let backend = seeded_backend(false).await;
        backend.sign_in("u1@example.com", "password-1").await.unwrap();

        let state = ConsoleState::new(backend);
        state.initialize().await.unwrap();

        assert!(state.auth.is_signed_in().await);
        let visible = state.resources.cached().await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id().as_str(), "r1");
    }

    #[tokio::test]
    async fn test_initialize_loads_everything_for_administrators() {
        let backend = seeded_backend(true).await;
        backend.sign_in("u1@example.com", "password-1").await.unwrap();

        let state = ConsoleState::new(backend);
        state.initialize().await.unwrap();

        assert!(state.auth.is_administrator().await);
        assert_eq!(state.resources.cached().await.len(), 2);
    }

    #[tokio::test]
    async fn test_initialize_without_session_keeps_scope_empty() {
        let state = ConsoleState::new(seeded_backend(false).await);

        state.initialize().await.unwrap();

        assert!(!state.auth.is_signed_in().await);
        assert!(state.auth.is_sign_in_required().await);
        assert!(state.resources.cached().await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_loads_everything_when_sign_in_not_required() {
        let backend = Arc::new(InMemoryBackend::new().with_sign_in_required(false));
        for (id, name) in [("r1", "Products"), ("r2", "Articles")] {
            ResourceStore::create(
                backend.as_ref(),
                Resource::new(ResourceId::new(id).unwrap(), name).unwrap(),
            )
            .await
            .unwrap();
        }

        let state = ConsoleState::new(backend);
        state.initialize().await.unwrap();

        assert!(state.auth.is_signed_in().await);
        assert_eq!(state.resources.cached().await.len(), 2);
    }

    #[tokio::test]
    async fn test_open_deployment_sign_in_keeps_full_directory() {
        // u1 in t1 holds only r1; r2 is ungranted
        let backend = Arc::new(InMemoryBackend::new().with_sign_in_required(false));
        IdentityStore::create(
            backend.as_ref(),
            Identity::new(IdentityId::new("u1").unwrap(), "User One", "u1@example.com").unwrap(),
            "password-1",
        )
        .await
        .unwrap();
        TeamStore::create(
            backend.as_ref(),
            Team::new(TeamId::new("t1").unwrap(), "Team One").unwrap(),
        )
        .await
        .unwrap();
        for (id, name) in [("r1", "Products"), ("r2", "Articles")] {
            ResourceStore::create(
                backend.as_ref(),
                Resource::new(ResourceId::new(id).unwrap(), name).unwrap(),
            )
            .await
            .unwrap();
        }
        backend
            .add_identity_to_team(&IdentityId::new("u1").unwrap(), &TeamId::new("t1").unwrap())
            .await
            .unwrap();
        backend
            .grant_resource_to_team(&ResourceId::new("r1").unwrap(), &TeamId::new("t1").unwrap())
            .await
            .unwrap();

        let state = ConsoleState::new(backend);
        state.initialize().await.unwrap();
        assert_eq!(state.resources.cached().await.len(), 2);

        // Signing in must not shrink the open deployment's visible set
        state
            .identities
            .sign_in("u1@example.com", "password-1")
            .await
            .unwrap();
        state.synchronizer.after_sign_in().await.unwrap();
        assert_eq!(state.resources.cached().await.len(), 2);

        // A grant change on the member team resyncs to the same rule
        let change = state.teams.remove_grant("r1", "t1").await.unwrap();
        state.synchronizer.synchronize(&change).await.unwrap();
        assert_eq!(state.resources.cached().await.len(), 2);
    }

    #[tokio::test]
    async fn test_initialize_surfaces_unreachable_backend() {
        let backend = seeded_backend(false).await;
        backend.set_unavailable(true);

        let state = ConsoleState::new(backend);
        let error = state.initialize().await.unwrap_err();

        assert!(error.is_unavailable());
    }

    #[tokio::test]
    async fn test_initialize_treats_rejected_session_as_signed_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/auth-info"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let config = ConsoleConfig {
            backend: BackendConfig {
                base_url: format!("{}/api/v1", server.uri()),
                timeout_secs: 5,
            },
            ..ConsoleConfig::default()
        };
        let state = create_console_state(&config).unwrap();

        state.initialize().await.unwrap();

        assert!(!state.auth.is_signed_in().await);
        assert!(state.resources.cached().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_console_state_rejects_malformed_base_url() {
        let config = ConsoleConfig {
            backend: BackendConfig {
                base_url: "not-a-url".to_string(),
                timeout_secs: 5,
            },
            ..ConsoleConfig::default()
        };

        assert!(create_console_state(&config).is_err());
    }

    #[tokio::test]
    async fn test_membership_removal_rescopes_through_the_console() {
        let state = ConsoleState::new(seeded_backend(false).await);
        let mut watcher = state.reload_watcher();

        state
            .identities
            .sign_in("u1@example.com", "password-1")
            .await
            .unwrap();
        state.synchronizer.after_sign_in().await.unwrap();
        assert_eq!(watcher.requested().await, Some(1));
        assert_eq!(state.resources.cached().await.len(), 1);

        let change = state.teams.remove_member("u1", "t1").await.unwrap();
        let outcome = state.synchronizer.synchronize(&change).await.unwrap();

        match outcome {
            SyncOutcome::Refreshed(refreshed) => {
                assert!(refreshed.member_teams().is_empty());
            }
            SyncOutcome::NotAffected => panic!("expected a refresh"),
        }
        assert_eq!(watcher.requested().await, Some(2));
        assert!(state.resources.cached().await.is_empty());
        assert!(state.auth.granted_resource_ids().await.is_empty());
    }
}
