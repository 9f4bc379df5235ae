//! Remote Store - Core Trait
//!
//! The interface the list manager needs from whatever backend holds the
//! authoritative copy of the groceries. Implementations can be in-memory,
//! SQLite, HTTP, etc.

use async_trait::async_trait;

use super::query::{Filter, FlagPatch, SortSpec};
use crate::domain::{DomainResult, GroceryItem, GroceryRecord, NewGrocery};

/// Authoritative grocery storage
///
/// All operations are async to support various backends.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Whether a background synchronization is currently merging data
    fn is_synchronizing(&self) -> bool;

    /// One-shot wait for the running synchronization to end
    ///
    /// Resolves immediately when nothing is running.
    async fn sync_finished(&self) -> DomainResult<()>;

    /// Fetch every record in the requested order
    async fn fetch_all(&self, sort: &SortSpec) -> DomainResult<Vec<GroceryRecord>>;

    /// Create a record, returning its remote id
    async fn create(&self, grocery: &NewGrocery) -> DomainResult<String>;

    /// Overwrite name and flags of the record with `item.id`
    async fn update_one(&self, item: &GroceryItem) -> DomainResult<()>;

    /// Apply `patch` to every record matching `filter`, returning the count
    async fn update_many(&self, filter: &Filter, patch: &FlagPatch) -> DomainResult<u64>;
}
