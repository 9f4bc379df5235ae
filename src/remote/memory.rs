//! In-Memory Store
//!
//! Process-local `RemoteStore`, handy for offline sessions and tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use super::gate::{SyncGate, SyncGuard};
use super::query::{Filter, FlagPatch, SortSpec};
use super::traits::RemoteStore;
use crate::domain::{DomainError, DomainResult, GroceryItem, GroceryRecord, NewGrocery};

#[derive(Default)]
struct Inner {
    records: Vec<GroceryRecord>,
    next_id: u64,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    /// Strictly increasing modification stamps so sort order is stable
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
    gate: SyncGate,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                ..Default::default()
            }),
            gate: SyncGate::new(),
        }
    }

    /// Seed with existing records (ids are kept as given)
    pub fn with_records(records: Vec<GroceryRecord>) -> Self {
        let next_id = records
            .iter()
            .filter_map(|r| r.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            inner: Mutex::new(Inner {
                records,
                next_id,
                last_stamp: None,
            }),
            gate: SyncGate::new(),
        }
    }

    /// Mark a background synchronization as running
    pub fn begin_sync(&self) -> SyncGuard {
        self.gate.begin()
    }

    /// Copy of the stored records, insertion order
    pub async fn records(&self) -> Vec<GroceryRecord> {
        self.inner.lock().await.records.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn is_synchronizing(&self) -> bool {
        self.gate.is_active()
    }

    async fn sync_finished(&self) -> DomainResult<()> {
        self.gate.wait_idle().await
    }

    async fn fetch_all(&self, sort: &SortSpec) -> DomainResult<Vec<GroceryRecord>> {
        let inner = self.inner.lock().await;
        let mut records = inner.records.clone();
        records.sort_by(|a, b| sort.compare(a, b));
        Ok(records)
    }

    async fn create(&self, grocery: &NewGrocery) -> DomainResult<String> {
        if grocery.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("grocery name is empty".to_string()));
        }

        let mut inner = self.inner.lock().await;
        let id = inner.next_id.to_string();
        inner.next_id += 1;

        let mut record = GroceryRecord::new(id.clone(), grocery.name.clone());
        record.done = Some(false);
        record.deleted = Some(false);
        record.modified_at = Some(inner.stamp());
        inner.records.push(record);

        Ok(id)
    }

    async fn update_one(&self, item: &GroceryItem) -> DomainResult<()> {
        if item.id.is_empty() {
            return Err(DomainError::InvalidInput("grocery has no remote id".to_string()));
        }

        let mut inner = self.inner.lock().await;
        let stamp = inner.stamp();
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == item.id)
            .ok_or_else(|| DomainError::NotFound(format!("grocery {}", item.id)))?;

        record.name = item.name.clone();
        record.done = Some(item.done);
        record.deleted = Some(item.deleted);
        record.modified_at = Some(stamp);
        Ok(())
    }

    async fn update_many(&self, filter: &Filter, patch: &FlagPatch) -> DomainResult<u64> {
        let mut inner = self.inner.lock().await;
        let stamp = inner.stamp();

        let mut changed = 0;
        for record in inner.records.iter_mut().filter(|r| filter.matches(r)) {
            patch.apply(record);
            record.modified_at = Some(stamp);
            changed += 1;
        }
        Ok(changed)
    }
}
