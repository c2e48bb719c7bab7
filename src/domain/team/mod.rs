//! Team domain module
//!
//! Teams are pure access-control groupings: identities reach resources
//! only through the teams they belong to. Each team owns a membership
//! edge (team-identity) and a grant edge (team-resource).

mod entity;
mod store;
mod validation;

pub use entity::{Team, TeamId};
pub use store::TeamStore;
pub use validation::{validate_team_id, validate_team_name, TeamValidationError};
