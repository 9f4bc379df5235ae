//! Sync Gate
//!
//! Tracks whether a background synchronization is running so readers can
//! wait for it to finish instead of reading a half-merged store.

use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::{DomainError, DomainResult};

/// Shared "synchronization in progress" flag
///
/// Nested `begin` calls are counted; the gate is idle again once every
/// guard is dropped.
#[derive(Clone)]
pub struct SyncGate {
    active: Arc<watch::Sender<usize>>,
}

impl SyncGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            active: Arc::new(tx),
        }
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow() > 0
    }

    /// Mark a synchronization as running until the guard is dropped
    pub fn begin(&self) -> SyncGuard {
        self.active.send_modify(|count| *count += 1);
        log::debug!("sync started");
        SyncGuard { gate: self.clone() }
    }

    /// Resolve once no synchronization is running
    pub async fn wait_idle(&self) -> DomainResult<()> {
        let mut rx = self.active.subscribe();
        rx.wait_for(|count| *count == 0)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::Internal(format!("sync gate closed: {}", e)))
    }
}

impl Default for SyncGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Ends its synchronization on drop
pub struct SyncGuard {
    gate: SyncGate,
}

impl Drop for SyncGuard {
    fn drop(&mut self) {
        self.gate
            .active
            .send_modify(|count| *count = count.saturating_sub(1));
        log::debug!("sync finished");
    }
}
