//! Sync Layer
//!
//! The optimistic grocery list and its reconciliation with a remote store.

mod error;
mod manager;


pub use error::{SyncError, SyncResult};
pub use manager::GroceryListSyncManager;
