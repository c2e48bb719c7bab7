//! Identity infrastructure implementations

mod directory;

pub use directory::{
    CreateIdentityRequest, IdentityDirectory, SignUpRequest, UpdateIdentityRequest,
};
