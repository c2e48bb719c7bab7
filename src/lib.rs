//! Rules Console
//!
//! Core of an administrative console for search-tuning rules with
//! team-scoped access control:
//! - Identity, team, and resource directories over a pluggable backend
//! - A cached authorization snapshot derived from team membership
//! - Grant synchronization that rescopes the visible resources whenever
//!   an association change affects the signed-in identity

pub mod config;
pub mod console;
pub mod domain;
pub mod infrastructure;

pub use config::ConsoleConfig;
pub use console::ConsoleState;

use std::sync::Arc;
use std::time::Duration;

use infrastructure::backend::HttpBackend;
use tracing::info;

/// Create an HTTP-backed console state from configuration
pub fn create_console_state(config: &ConsoleConfig) -> anyhow::Result<ConsoleState<HttpBackend>> {
    let base_url = reqwest::Url::parse(&config.backend.base_url).map_err(|e| {
        anyhow::anyhow!(
            "Invalid backend base URL '{}': {}",
            config.backend.base_url,
            e
        )
    })?;

    info!(base_url = %base_url, "Creating HTTP-backed console state");

    let backend = HttpBackend::new(
        base_url.as_str(),
        Duration::from_secs(config.backend.timeout_secs),
    );

    Ok(ConsoleState::new(Arc::new(backend)))
}
