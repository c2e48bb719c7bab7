//! Infrastructure layer - Store implementations and wiring

pub mod auth;
pub mod backend;
pub mod identity;
pub mod logging;
pub mod resource;
pub mod team;
