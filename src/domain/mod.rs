//! Domain layer - Core business logic and entities

pub mod auth;
pub mod error;
pub mod identity;
pub mod resource;
pub mod team;

pub use auth::{AssociationChange, AuthorizationState, EdgeKind, SessionStore};
pub use error::DomainError;
pub use identity::{
    validate_email, validate_identity_id, validate_identity_name, validate_password, Identity,
    IdentityFilter, IdentityId, IdentityStore, IdentityValidationError,
};
pub use resource::{
    validate_field_name, validate_resource_id, validate_resource_name, Resource, ResourceId,
    ResourceStore, ResourceValidationError, SuggestedField, SuggestedFieldId,
};
pub use team::{validate_team_id, validate_team_name, Team, TeamId, TeamStore, TeamValidationError};
