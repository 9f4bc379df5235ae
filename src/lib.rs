//! Grocery Sync
//!
//! Layered architecture:
//! - domain: Grocery entities and store errors
//! - remote: Store abstraction and implementations (memory, SQLite, HTTP)
//! - store: Snapshot publishing and list views
//! - sync: The optimistic list manager
//! - config: Backend settings persisted as JSON

pub mod config;
pub mod domain;
pub mod remote;
pub mod store;
pub mod sync;

pub use config::{load_config, save_config, ConfigError, GroceryConfig};
pub use domain::{DomainError, DomainResult, GroceryItem, GroceryRecord, ItemKey, NewGrocery};
pub use remote::{HttpStore, MemoryStore, RemoteStore, SqliteStore};
pub use store::{ChannelPublisher, SnapshotPublisher, WatchPublisher};
pub use sync::{GroceryListSyncManager, SyncError, SyncResult};

/// Start the rolling file logger if the config names a log directory
///
/// Returns whether logging was started.
pub fn init_logging(config: &GroceryConfig) -> Result<bool, String> {
    let Some(dir) = &config.log_dir else {
        return Ok(false);
    };
    rolling_logger::init_logger(dir.clone(), "GrocerySync")?;
    let _ = rolling_logger::info("Grocery sync logging started");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_off_without_dir() {
        let config = GroceryConfig::new("https://api.example.com", "token");
        assert_eq!(init_logging(&config), Ok(false));
    }
}
