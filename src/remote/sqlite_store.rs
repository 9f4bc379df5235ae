//! SQLite Store
//!
//! Local database implementation of `RemoteStore`. Used as the offline
//! backend; ids are row ids rendered as strings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::db::open_db;
use super::gate::{SyncGate, SyncGuard};
use super::query::{Filter, FlagPatch, SortDirection, SortField, SortSpec};
use super::traits::RemoteStore;
use crate::domain::{DomainError, DomainResult, GroceryItem, GroceryRecord, NewGrocery};

/// Next modification stamp: wall clock, but never behind the newest row
const NEXT_STAMP: &str = "MAX(?, (SELECT COALESCE(MAX(modified_at), 0) + 1 FROM groceries))";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    gate: SyncGate,
}

impl SqliteStore {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            conn,
            gate: SyncGate::new(),
        }
    }

    /// Open the database file at `db_path`, migrating it if needed
    pub fn open(db_path: &Path) -> DomainResult<Self> {
        let conn = open_db(db_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// Mark a background synchronization as running
    pub fn begin_sync(&self) -> SyncGuard {
        self.gate.begin()
    }
}

fn parse_row_id(id: &str) -> DomainResult<i64> {
    id.parse::<i64>()
        .map_err(|_| DomainError::InvalidInput(format!("not a local grocery id: {:?}", id)))
}

fn order_clause(sort: &SortSpec) -> &'static str {
    match (sort.field, sort.direction) {
        (SortField::ModifiedAt, SortDirection::Descending) => "modified_at DESC, id DESC",
        (SortField::ModifiedAt, SortDirection::Ascending) => "modified_at ASC, id ASC",
        (SortField::Name, SortDirection::Descending) => "name DESC, id DESC",
        (SortField::Name, SortDirection::Ascending) => "name ASC, id ASC",
    }
}

/// Convert a database row to GroceryRecord
fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<GroceryRecord> {
    let micros: i64 = row.get(4)?;
    Ok(GroceryRecord {
        id: row.get::<_, i64>(0)?.to_string(),
        name: row.get(1)?,
        done: Some(row.get::<_, i64>(2)? != 0),
        deleted: Some(row.get::<_, i64>(3)? != 0),
        modified_at: if micros > 0 {
            DateTime::<Utc>::from_timestamp_micros(micros)
        } else {
            None
        },
    })
}

#[async_trait]
impl RemoteStore for SqliteStore {
    fn is_synchronizing(&self) -> bool {
        self.gate.is_active()
    }

    async fn sync_finished(&self) -> DomainResult<()> {
        self.gate.wait_idle().await
    }

    async fn fetch_all(&self, sort: &SortSpec) -> DomainResult<Vec<GroceryRecord>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(&format!(
            "SELECT id, name, done, deleted, modified_at FROM groceries ORDER BY {}",
            order_clause(sort)
        ))?;
        let rows = stmt.query_map([], row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    async fn create(&self, grocery: &NewGrocery) -> DomainResult<String> {
        if grocery.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("grocery name is empty".to_string()));
        }

        let conn = self.conn.lock().await;
        conn.execute(
            &format!(
                "INSERT INTO groceries (name, done, deleted, modified_at) VALUES (?, 0, 0, {})",
                NEXT_STAMP
            ),
            params![grocery.name, Utc::now().timestamp_micros()],
        )?;

        Ok(conn.last_insert_rowid().to_string())
    }

    async fn update_one(&self, item: &GroceryItem) -> DomainResult<()> {
        let id = parse_row_id(&item.id)?;
        let conn = self.conn.lock().await;

        let changed = conn.execute(
            &format!(
                "UPDATE groceries SET name = ?, done = ?, deleted = ?, modified_at = {} WHERE id = ?",
                NEXT_STAMP
            ),
            params![
                item.name,
                item.done as i64,
                item.deleted as i64,
                Utc::now().timestamp_micros(),
                id
            ],
        )?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("grocery {}", item.id)));
        }
        Ok(())
    }

    async fn update_many(&self, filter: &Filter, patch: &FlagPatch) -> DomainResult<u64> {
        let Filter::IdIn(ids) = filter;
        // Ids minted elsewhere can never match a local row
        let row_ids: Vec<i64> = ids.iter().filter_map(|id| id.parse().ok()).collect();
        if row_ids.is_empty() {
            return Ok(0);
        }

        let mut sets = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if let Some(done) = patch.done {
            sets.push("done = ?".to_string());
            values.push(Value::Integer(done as i64));
        }
        if let Some(deleted) = patch.deleted {
            sets.push("deleted = ?".to_string());
            values.push(Value::Integer(deleted as i64));
        }
        if sets.is_empty() {
            return Ok(0);
        }
        sets.push(format!("modified_at = {}", NEXT_STAMP));
        values.push(Value::Integer(Utc::now().timestamp_micros()));

        let placeholders = vec!["?"; row_ids.len()].join(", ");
        values.extend(row_ids.into_iter().map(Value::Integer));

        let conn = self.conn.lock().await;
        let changed = conn.execute(
            &format!(
                "UPDATE groceries SET {} WHERE id IN ({})",
                sets.join(", "),
                placeholders
            ),
            params_from_iter(values),
        )?;

        Ok(changed as u64)
    }
}
