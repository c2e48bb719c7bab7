//! Console configuration

mod app_config;

pub use app_config::{BackendConfig, ConsoleConfig, LogFormat, LoggingConfig};
