//! View reload signal
//!
//! A watch channel carrying a reload generation counter. The notifier
//! side is held by the grant synchronizer; view layers hold watchers.
//! Back-to-back requests coalesce: a watcher that was not waiting sees
//! one wake-up with the latest generation.

use tokio::sync::watch;
use tracing::debug;

/// Create a connected notifier/watcher pair
pub fn reload_channel() -> (ReloadNotifier, ReloadWatcher) {
    let (tx, rx) = watch::channel(0);
    (ReloadNotifier { tx }, ReloadWatcher { rx })
}

/// Sending half of the reload signal
#[derive(Debug)]
pub struct ReloadNotifier {
    tx: watch::Sender<u64>,
}

impl ReloadNotifier {
    /// Request that every watching view reload itself
    pub fn request_reload(&self) {
        self.tx.send_modify(|generation| *generation += 1);
        debug!(generation = *self.tx.borrow(), "Requested view reload");
    }

    /// The current reload generation
    pub fn generation(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Create another watcher for the same signal
    pub fn subscribe(&self) -> ReloadWatcher {
        ReloadWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

/// Receiving half of the reload signal
#[derive(Debug, Clone)]
pub struct ReloadWatcher {
    rx: watch::Receiver<u64>,
}

impl ReloadWatcher {
    /// Wait for the next reload request.
    ///
    /// Returns the reload generation, or `None` once the notifier side
    /// has been dropped.
    pub async fn requested(&mut self) -> Option<u64> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Whether a reload request arrived since the last wait
    pub fn has_pending(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}
