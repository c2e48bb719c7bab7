//! Identity store trait

use async_trait::async_trait;

use super::entity::{Identity, IdentityId};
use crate::domain::DomainError;

/// Filter for identity listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdentityFilter {
    /// Every identity in the directory
    #[default]
    All,
    /// Only the identities with the given ids
    Ids(Vec<IdentityId>),
}

impl IdentityFilter {
    /// Build an id filter from any id collection
    pub fn ids(ids: impl IntoIterator<Item = IdentityId>) -> Self {
        Self::Ids(ids.into_iter().collect())
    }

    /// True when the filter can never match anything
    pub fn is_empty_selection(&self) -> bool {
        matches!(self, Self::Ids(ids) if ids.is_empty())
    }

    /// Whether an identity id passes the filter
    pub fn matches(&self, id: &IdentityId) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.contains(id),
        }
    }
}

/// Store for identities and the session they establish.
///
/// Sign-in and sign-out live here rather than on the session snapshot
/// because the backing service treats them as identity operations; the
/// snapshot is read through [`SessionStore`](crate::domain::auth::SessionStore).
#[async_trait]
pub trait IdentityStore: Send + Sync + std::fmt::Debug {
    /// List identities matching the filter
    async fn list(&self, filter: &IdentityFilter) -> Result<Vec<Identity>, DomainError>;

    /// Get an identity by ID
    async fn get(&self, id: &IdentityId) -> Result<Option<Identity>, DomainError>;

    /// Look up an identity by its (unique) email address
    async fn lookup_by_email(&self, email: &str) -> Result<Option<Identity>, DomainError>;

    /// Create a new identity with its initial credential
    async fn create(&self, identity: Identity, credential: &str) -> Result<Identity, DomainError>;

    /// Update an identity, optionally replacing its credential
    async fn update(
        &self,
        identity: Identity,
        credential: Option<&str>,
    ) -> Result<Identity, DomainError>;

    /// Delete an identity by ID
    async fn delete(&self, id: &IdentityId) -> Result<bool, DomainError>;

    /// Establish a session for the given credentials
    async fn sign_in(&self, email: &str, credential: &str) -> Result<Identity, DomainError>;

    /// Tear down the current session
    async fn sign_out(&self) -> Result<(), DomainError>;
}
