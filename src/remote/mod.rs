//! Remote Layer
//!
//! Store abstraction the list manager syncs against, plus implementations.

mod db;
mod gate;
mod http_store;
mod memory;
mod query;
mod sqlite_store;
mod traits;


pub use db::open_db;
pub use gate::{SyncGate, SyncGuard};
pub use http_store::HttpStore;
pub use memory::MemoryStore;
pub use query::{Filter, FlagPatch, SortDirection, SortField, SortSpec};
pub use sqlite_store::SqliteStore;
pub use traits::RemoteStore;
