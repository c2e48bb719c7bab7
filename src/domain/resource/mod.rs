//! Resource domain module
//!
//! A resource is an indexed collection that search-tuning rules apply
//! to. Access control is granted per resource, via teams.

mod entity;
mod store;
mod validation;

pub use entity::{Resource, ResourceId, SuggestedField, SuggestedFieldId};
pub use store::ResourceStore;
pub use validation::{
    validate_field_name, validate_resource_id, validate_resource_name, ResourceValidationError,
};
