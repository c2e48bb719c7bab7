//! Team infrastructure implementations

mod directory;

pub use directory::{CreateTeamRequest, TeamDirectory, UpdateTeamRequest};
