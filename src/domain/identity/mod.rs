//! Identity domain
//!
//! Identities are the people who sign in to the console. They are not
//! team-scoped themselves; team membership lives on the team's
//! association edges.

mod entity;
mod store;
mod validation;

pub use entity::{Identity, IdentityId};
pub use store::{IdentityFilter, IdentityStore};
pub use validation::{
    validate_email, validate_identity_id, validate_identity_name, validate_password,
    IdentityValidationError,
};
