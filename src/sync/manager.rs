//! Grocery List Sync Manager
//!
//! Owns the in-memory list, applies changes optimistically, then pushes
//! them to the remote store. Every change to the list is published as a
//! fresh copy before the matching remote call is issued.
//!
//! Remote failures never roll back the local change and are never retried
//! here; re-invoking the operation is up to the caller.

use std::sync::Arc;
use tokio::sync::Mutex;

use super::error::{
    SyncError, SyncResult, ADD_FAILED, LOAD_FAILED, RESTORE_FAILED, SYNC_WAIT_FAILED,
    UPDATE_FAILED,
};
use crate::domain::{GroceryItem, ItemKey, NewGrocery};
use crate::remote::{Filter, FlagPatch, RemoteStore, SortSpec};
use crate::store::SnapshotPublisher;

struct ListState {
    /// Newest additions first
    items: Vec<GroceryItem>,
    next_key: u64,
}

impl ListState {
    fn next_key(&mut self) -> ItemKey {
        let key = ItemKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn position(&self, key: ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key == key)
    }
}

pub struct GroceryListSyncManager {
    remote: Arc<dyn RemoteStore>,
    publisher: Arc<dyn SnapshotPublisher>,
    state: Mutex<ListState>,
}

impl GroceryListSyncManager {
    pub fn new(remote: Arc<dyn RemoteStore>, publisher: Arc<dyn SnapshotPublisher>) -> Self {
        Self {
            remote,
            publisher,
            state: Mutex::new(ListState {
                items: Vec::new(),
                next_key: 1,
            }),
        }
    }

    /// Called with the state lock held so snapshots follow mutation order
    fn publish(&self, state: &ListState) {
        self.publisher.publish(state.items.clone());
    }

    // ========================
    // Operations
    // ========================

    /// Append every remote grocery to the list, newest modification first
    ///
    /// Waits for a running background synchronization to end before
    /// reading, so a half-merged store is never observed.
    pub async fn load(&self) -> SyncResult<Vec<GroceryItem>> {
        if self.remote.is_synchronizing() {
            log::info!("sync in progress, deferring load");
            self.remote.sync_finished().await.map_err(|e| {
                log::error!("waiting for sync failed: {}", e);
                SyncError::SyncWait(SYNC_WAIT_FAILED.to_string())
            })?;
        }

        let records = self
            .remote
            .fetch_all(&SortSpec::modified_desc())
            .await
            .map_err(|e| {
                log::error!("fetching groceries failed: {}", e);
                SyncError::RemoteFetch(LOAD_FAILED.to_string())
            })?;

        let mut state = self.state.lock().await;
        let fetched = records.len();
        for record in records {
            let key = state.next_key();
            state.items.push(GroceryItem::from_record(key, record));
        }
        self.publish(&state);

        log::info!("loaded {} groceries", fetched);
        Ok(state.items.clone())
    }

    /// Put a new grocery at the top of the list, then create it remotely
    ///
    /// The returned item carries the remote id. If the create fails the
    /// entry stays on the list unsynced.
    pub async fn add(&self, name: &str) -> SyncResult<GroceryItem> {
        let item = {
            let mut state = self.state.lock().await;
            let key = state.next_key();
            let item = GroceryItem::new(key, name);
            state.items.insert(0, item.clone());
            self.publish(&state);
            item
        };

        let new = NewGrocery {
            name: item.name.clone(),
        };
        let id = self.remote.create(&new).await.map_err(|e| {
            log::error!("creating grocery {:?} failed: {}", item.name, e);
            SyncError::RemoteWrite(ADD_FAILED.to_string())
        })?;

        let mut state = self.state.lock().await;
        let Some(pos) = state.position(item.key) else {
            return Ok(item.with_id(id));
        };
        // Keep any flag changes made while the create was in flight
        let synced = state.items[pos].with_id(id);
        state.items[pos] = synced.clone();
        self.publish(&state);

        log::debug!("grocery {} synced as {}", synced.key, synced.id);
        Ok(synced)
    }

    /// Soft-delete; deleting also clears `done`
    pub async fn set_delete_flag(&self, key: ItemKey) -> SyncResult<GroceryItem> {
        let item = self.replace(key, GroceryItem::with_deleted).await?;
        self.sync_one(&item).await?;
        Ok(item)
    }

    /// Flip `done`. With `skip_sync` only the local list changes.
    pub async fn toggle_done_flag(&self, key: ItemKey, skip_sync: bool) -> SyncResult<GroceryItem> {
        let item = self.replace(key, GroceryItem::with_done_toggled).await?;
        if !skip_sync {
            self.sync_one(&item).await?;
        }
        Ok(item)
    }

    /// Bring back every entry that is both deleted and done
    ///
    /// Returns how many entries were restored. Entries the store never
    /// acknowledged are restored locally only.
    pub async fn restore(&self) -> SyncResult<usize> {
        let (ids, restored) = {
            let mut state = self.state.lock().await;
            let mut ids = Vec::new();
            let mut restored = 0;
            for slot in state.items.iter_mut().filter(|item| item.is_restorable()) {
                if slot.is_synced() {
                    ids.push(slot.id.clone());
                }
                *slot = slot.with_restored();
                restored += 1;
            }
            self.publish(&state);
            (ids, restored)
        };

        if ids.is_empty() {
            return Ok(restored);
        }

        self.remote
            .update_many(&Filter::IdIn(ids), &FlagPatch::restored())
            .await
            .map_err(|e| {
                log::error!("restoring groceries failed: {}", e);
                SyncError::RemoteWrite(RESTORE_FAILED.to_string())
            })?;

        log::debug!("restored {} groceries", restored);
        Ok(restored)
    }

    // ========================
    // Read Accessors
    // ========================

    /// Copy of the current list
    pub async fn items(&self) -> Vec<GroceryItem> {
        self.state.lock().await.items.clone()
    }

    pub async fn get(&self, key: ItemKey) -> Option<GroceryItem> {
        let state = self.state.lock().await;
        state.position(key).map(|pos| state.items[pos].clone())
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.items.is_empty()
    }

    /// Entries still waiting for their remote create
    pub async fn unsynced_count(&self) -> usize {
        let state = self.state.lock().await;
        state.items.iter().filter(|item| !item.is_synced()).count()
    }

    // ========================
    // Helpers
    // ========================

    /// Swap the entry with `key` for `change(entry)` and publish
    async fn replace(
        &self,
        key: ItemKey,
        change: impl FnOnce(&GroceryItem) -> GroceryItem,
    ) -> SyncResult<GroceryItem> {
        let mut state = self.state.lock().await;
        let pos = state.position(key).ok_or(SyncError::NotTracked(key))?;
        let item = change(&state.items[pos]);
        state.items[pos] = item.clone();
        self.publish(&state);
        Ok(item)
    }

    async fn sync_one(&self, item: &GroceryItem) -> SyncResult<()> {
        self.remote.update_one(item).await.map_err(|e| {
            log::error!("updating grocery {} ({:?}) failed: {}", item.key, item.id, e);
            SyncError::RemoteWrite(UPDATE_FAILED.to_string())
        })
    }
}
