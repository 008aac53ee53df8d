//! Connectivity state
//!
//! The host app reports network reachability; the dispatch layer reads the
//! last known value before every request and fails fast when offline.

use tokio::sync::watch;

/// Shared online/offline flag
#[derive(Debug, Clone)]
pub struct Connectivity {
    tx: watch::Sender<bool>,
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (tx, _rx) = watch::channel(online);
        Self { tx }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Report a reachability change; observers are notified only on change
    pub fn set_online(&self, online: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                return false;
            }
            *current = online;
            true
        });
        if changed {
            tracing::info!(online, "Connectivity changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Resolve once the device is online
    pub async fn wait_online(&self) {
        let mut rx = self.subscribe();
        // the sender lives in `self`, so wait_for cannot observe a closed channel
        let _ = rx.wait_for(|online| *online).await;
    }
}
