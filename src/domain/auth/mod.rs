//! Authorization domain module
//!
//! The authorization snapshot is the cached tuple of current identity,
//! member teams, and granted resources. Association change events
//! describe the edge mutations that can invalidate it.

mod event;
mod snapshot;
mod store;

pub use event::{AssociationChange, EdgeKind};
pub use snapshot::AuthorizationState;
pub use store::SessionStore;

#[cfg(test)]
pub use store::MockSessionStore;
