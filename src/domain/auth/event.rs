//! Association change events
//!
//! Every successful edge mutation yields one of these, and callers
//! hand it to the grant synchronizer. The event carries everything the
//! self-affecting decision needs, so that decision can stay a pure
//! function of (event, snapshot).

use serde::{Deserialize, Serialize};

use crate::domain::identity::IdentityId;
use crate::domain::resource::ResourceId;
use crate::domain::team::TeamId;

/// Direction of an edge mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Added,
    Removed,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A completed mutation of one association edge.
///
/// `Membership { identity: None, .. }` is the sentinel for "the edge
/// itself collapsed" (team deletion): no single identity is named, and
/// whether the change is self-affecting depends on the caller's own
/// membership in the team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edge", rename_all = "snake_case")]
pub enum AssociationChange {
    /// Team-identity edge changed
    #[serde(rename_all = "camelCase")]
    Membership {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        identity: Option<IdentityId>,
        team: TeamId,
        kind: EdgeKind,
    },
    /// Team-resource edge changed
    #[serde(rename_all = "camelCase")]
    Grant {
        resource: ResourceId,
        team: TeamId,
        kind: EdgeKind,
    },
}

impl AssociationChange {
    /// An identity joined a team
    pub fn membership_added(identity: IdentityId, team: TeamId) -> Self {
        Self::Membership {
            identity: Some(identity),
            team,
            kind: EdgeKind::Added,
        }
    }

    /// An identity left (or was removed from) a team
    pub fn membership_removed(identity: IdentityId, team: TeamId) -> Self {
        Self::Membership {
            identity: Some(identity),
            team,
            kind: EdgeKind::Removed,
        }
    }

    /// A team's membership edge collapsed wholesale (team deleted)
    pub fn membership_collapsed(team: TeamId) -> Self {
        Self::Membership {
            identity: None,
            team,
            kind: EdgeKind::Removed,
        }
    }

    /// A resource was granted to a team
    pub fn grant_added(resource: ResourceId, team: TeamId) -> Self {
        Self::Grant {
            resource,
            team,
            kind: EdgeKind::Added,
        }
    }

    /// A resource grant was revoked from a team
    pub fn grant_removed(resource: ResourceId, team: TeamId) -> Self {
        Self::Grant {
            resource,
            team,
            kind: EdgeKind::Removed,
        }
    }

    /// The team whose edge changed
    pub fn team(&self) -> &TeamId {
        match self {
            Self::Membership { team, .. } | Self::Grant { team, .. } => team,
        }
    }

    /// The direction of the change
    pub fn kind(&self) -> EdgeKind {
        match self {
            Self::Membership { kind, .. } | Self::Grant { kind, .. } => *kind,
        }
    }
}

impl std::fmt::Display for AssociationChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Membership {
                identity: Some(identity),
                team,
                kind,
            } => write!(f, "membership {} (identity '{}', team '{}')", kind, identity, team),
            Self::Membership {
                identity: None,
                team,
                kind,
            } => write!(f, "membership {} (team '{}')", kind, team),
            Self::Grant {
                resource,
                team,
                kind,
            } => write!(f, "grant {} (resource '{}', team '{}')", kind, resource, team),
        }
    }
}
