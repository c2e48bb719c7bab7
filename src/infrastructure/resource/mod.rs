//! Resource infrastructure implementations

mod directory;

pub use directory::{CreateResourceRequest, ResourceDirectory, UpdateResourceRequest};
