//! Sync Errors
//!
//! What callers of the list manager see when a remote call fails. The raw
//! store error is logged, never returned; callers get one of these fixed
//! messages instead.

use thiserror::Error;

use crate::domain::ItemKey;

pub const LOAD_FAILED: &str = "could not load groceries";
pub const ADD_FAILED: &str = "could not add grocery";
pub const UPDATE_FAILED: &str = "could not update grocery";
pub const RESTORE_FAILED: &str = "could not restore groceries";
pub const SYNC_WAIT_FAILED: &str = "sync did not finish";

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// Reading the list from the store failed
    #[error("{0}")]
    RemoteFetch(String),
    /// A create, update, or bulk update failed
    #[error("{0}")]
    RemoteWrite(String),
    /// Waiting for a background synchronization failed
    #[error("{0}")]
    SyncWait(String),
    #[error("grocery {0} is not on the list")]
    NotTracked(ItemKey),
}

impl SyncError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
