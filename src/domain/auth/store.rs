//! Session store trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::snapshot::AuthorizationState;
use crate::domain::DomainError;

/// Store yielding the authorization snapshot of the current session.
///
/// The fetch is one logical read: identity, memberships, and grants
/// arrive together, so the caller can never observe them half-updated.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch a fresh authorization snapshot
    async fn fetch_auth_snapshot(&self) -> Result<AuthorizationState, DomainError>;
}
