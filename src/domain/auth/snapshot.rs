//! Authorization snapshot

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::identity::{Identity, IdentityId};
use crate::domain::resource::ResourceId;
use crate::domain::team::TeamId;

/// The cached answer to "who is signed in and what may they touch".
///
/// Derived state, owned by the server: `granted_resources` must equal
/// the union of the team-resource edges of every team in
/// `member_teams`. The snapshot is always replaced wholesale, never
/// patched field by field, so that invariant cannot be half-updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationState {
    /// The signed-in identity, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    current_identity: Option<Identity>,
    /// Teams the current identity belongs to
    member_teams: HashSet<TeamId>,
    /// Resources granted through those teams
    granted_resources: HashSet<ResourceId>,
    /// Whether the deployment requires sign-in at all
    sign_in_required: bool,
    /// Whether the current session is signed in
    signed_in: bool,
}

impl AuthorizationState {
    /// Snapshot for a session with nobody signed in
    pub fn anonymous(sign_in_required: bool) -> Self {
        Self {
            current_identity: None,
            member_teams: HashSet::new(),
            granted_resources: HashSet::new(),
            sign_in_required,
            signed_in: false,
        }
    }

    /// Snapshot for a signed-in session
    pub fn authenticated(
        identity: Identity,
        member_teams: HashSet<TeamId>,
        granted_resources: HashSet<ResourceId>,
    ) -> Self {
        Self {
            current_identity: Some(identity),
            member_teams,
            granted_resources,
            sign_in_required: true,
            signed_in: true,
        }
    }

    /// Override the deployment sign-in policy (builder pattern)
    pub fn with_sign_in_required(mut self, sign_in_required: bool) -> Self {
        self.sign_in_required = sign_in_required;
        self
    }

    // Reads

    pub fn current_identity(&self) -> Option<&Identity> {
        self.current_identity.as_ref()
    }

    /// Id of the signed-in identity, if any
    pub fn identity_id(&self) -> Option<&IdentityId> {
        self.current_identity.as_ref().map(Identity::id)
    }

    pub fn member_teams(&self) -> &HashSet<TeamId> {
        &self.member_teams
    }

    pub fn granted_resources(&self) -> &HashSet<ResourceId> {
        &self.granted_resources
    }

    pub fn is_sign_in_required(&self) -> bool {
        self.sign_in_required
    }

    /// Signed in by policy: either sign-in is not required at all, or
    /// the session actually is signed in
    pub fn is_signed_in(&self) -> bool {
        !self.sign_in_required || self.signed_in
    }

    /// Administrator access, never elevated by absence of an identity
    pub fn is_administrator(&self) -> bool {
        self.current_identity
            .as_ref()
            .is_some_and(Identity::is_administrator)
    }

    /// Whether the session must change its password before continuing
    pub fn is_password_change_required(&self) -> bool {
        self.is_signed_in()
            && self
                .current_identity
                .as_ref()
                .is_some_and(Identity::must_change_password)
    }

    /// Whether the visible resource set must be restricted to the
    /// grant set. Administrators and open deployments (sign-in not
    /// required) see the full directory instead.
    pub fn is_grant_scoped(&self) -> bool {
        !self.is_administrator() && self.sign_in_required
    }

    pub fn is_member_of(&self, team: &TeamId) -> bool {
        self.member_teams.contains(team)
    }

    pub fn has_grant(&self, resource: &ResourceId) -> bool {
        self.granted_resources.contains(resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(admin: bool) -> Identity {
        Identity::new(
            IdentityId::new("u1").unwrap(),
            "User One",
            "u1@example.com",
        )
        .unwrap()
        .with_administrator(admin)
    }

    fn team(id: &str) -> TeamId {
        TeamId::new(id).unwrap()
    }

    fn resource(id: &str) -> ResourceId {
        ResourceId::new(id).unwrap()
    }

    #[test]
    fn test_anonymous_with_required_sign_in() {
        let state = AuthorizationState::anonymous(true);

        assert!(!state.is_signed_in());
        assert!(!state.is_administrator());
        assert!(state.granted_resources().is_empty());
        assert!(state.identity_id().is_none());
    }

    #[test]
    fn test_anonymous_with_open_policy() {
        // Sign-in not required: the session counts as signed in
        let state = AuthorizationState::anonymous(false);
        assert!(state.is_signed_in());
        assert!(!state.is_administrator());
    }

    #[test]
    fn test_authenticated_session() {
        let members: HashSet<_> = [team("t1")].into();
        let grants: HashSet<_> = [resource("r1"), resource("r2")].into();
        let state = AuthorizationState::authenticated(identity(false), members, grants);

        assert!(state.is_signed_in());
        assert!(!state.is_administrator());
        assert!(state.is_member_of(&team("t1")));
        assert!(!state.is_member_of(&team("t2")));
        assert!(state.has_grant(&resource("r2")));
        assert!(!state.has_grant(&resource("r3")));
        assert_eq!(state.identity_id().unwrap().as_str(), "u1");
    }

    #[test]
    fn test_administrator_flag_follows_identity() {
        let state =
            AuthorizationState::authenticated(identity(true), HashSet::new(), HashSet::new());
        assert!(state.is_administrator());
    }

    #[test]
    fn test_grant_scoping_rule() {
        // Regular member on a closed deployment: scoped to grants
        let members: HashSet<_> = [team("t1")].into();
        let member = AuthorizationState::authenticated(identity(false), members, HashSet::new());
        assert!(member.is_grant_scoped());

        // Administrators are never scoped
        let admin =
            AuthorizationState::authenticated(identity(true), HashSet::new(), HashSet::new());
        assert!(!admin.is_grant_scoped());

        // Open deployment: nobody is scoped, signed in or not
        let open_member = AuthorizationState::authenticated(
            identity(false),
            HashSet::new(),
            HashSet::new(),
        )
        .with_sign_in_required(false);
        assert!(!open_member.is_grant_scoped());
        assert!(!AuthorizationState::anonymous(false).is_grant_scoped());
    }

    #[test]
    fn test_password_change_required() {
        let forced = identity(false).with_must_change_password(true);
        let state = AuthorizationState::authenticated(forced, HashSet::new(), HashSet::new());
        assert!(state.is_password_change_required());

        let relaxed =
            AuthorizationState::authenticated(identity(false), HashSet::new(), HashSet::new());
        assert!(!relaxed.is_password_change_required());

        // Nobody signed in: nothing to force
        assert!(!AuthorizationState::anonymous(true).is_password_change_required());
    }

    #[test]
    fn test_serializes_camel_case() {
        let state = AuthorizationState::anonymous(true);
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["signInRequired"], true);
        assert_eq!(json["signedIn"], false);
        assert!(json.get("currentIdentity").is_none());
        assert!(json["memberTeams"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_deserializes_snapshot() {
        let json = r#"{
            "currentIdentity": {
                "id": "u1",
                "name": "User One",
                "email": "u1@example.com",
                "isAdministrator": false,
                "mustChangePassword": false
            },
            "memberTeams": ["t1"],
            "grantedResources": ["r1", "r2"],
            "signInRequired": true,
            "signedIn": true
        }"#;

        let state: AuthorizationState = serde_json::from_str(json).unwrap();
        assert!(state.is_signed_in());
        assert_eq!(state.member_teams().len(), 1);
        assert_eq!(state.granted_resources().len(), 2);
    }
}
