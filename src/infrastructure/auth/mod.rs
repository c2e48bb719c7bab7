//! Authorization infrastructure - Cache, synchronizer and reload signal

mod cache;
mod reload;
mod synchronizer;

pub use cache::AuthorizationCache;
pub use reload::{reload_channel, ReloadNotifier, ReloadWatcher};
pub use synchronizer::{GrantSynchronizer, SyncOutcome};
