//! Grocery Entity
//!
//! A single entry of the shopping list. Items are values: every state change
//! produces a new `GroceryItem` that replaces the old one in the list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entity::Entity;

/// Client-local identity of a list entry
///
/// Assigned when the entry enters the list and never changes, so an entry
/// can be found both before and after the remote create is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey(pub u64);

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A grocery list entry as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroceryItem {
    /// Local key
    pub key: ItemKey,
    /// Remote id, empty until the remote create completes
    pub id: String,
    /// Display text
    pub name: String,
    /// Checked off
    pub done: bool,
    /// Soft-deleted
    pub deleted: bool,
}

impl GroceryItem {
    /// A fresh, not yet synced entry
    pub fn new(key: ItemKey, name: impl Into<String>) -> Self {
        Self {
            key,
            id: String::new(),
            name: name.into(),
            done: false,
            deleted: false,
        }
    }

    pub fn from_record(key: ItemKey, record: GroceryRecord) -> Self {
        Self {
            key,
            id: record.id,
            name: record.name,
            done: record.done.unwrap_or(false),
            deleted: record.deleted.unwrap_or(false),
        }
    }

    /// Whether the remote store has acknowledged this entry
    pub fn is_synced(&self) -> bool {
        !self.id.is_empty()
    }

    /// Deleted entries that were also checked off can be brought back
    pub fn is_restorable(&self) -> bool {
        self.deleted && self.done
    }

    pub fn with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..self.clone()
        }
    }

    /// Soft-deleted copy; deleting always clears `done`
    pub fn with_deleted(&self) -> Self {
        Self {
            deleted: true,
            done: false,
            ..self.clone()
        }
    }

    pub fn with_done_toggled(&self) -> Self {
        Self {
            done: !self.done,
            ..self.clone()
        }
    }

    pub fn with_restored(&self) -> Self {
        Self {
            deleted: false,
            done: false,
            ..self.clone()
        }
    }
}

impl Entity for GroceryItem {
    type Key = ItemKey;

    fn key(&self) -> Self::Key {
        self.key
    }
}

/// Grocery as stored remotely
///
/// `done` and `deleted` may be absent on records written by older clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroceryRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

impl GroceryRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            done: None,
            deleted: None,
            modified_at: None,
        }
    }
}

/// Payload of a remote create: only the name travels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewGrocery {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_is_unsynced() {
        let item = GroceryItem::new(ItemKey(1), "Milk");
        assert_eq!(item.key(), ItemKey(1));
        assert_eq!(item.id, "");
        assert!(!item.done);
        assert!(!item.deleted);
        assert!(!item.is_synced());
    }

    #[test]
    fn test_record_defaults_missing_flags() {
        let record: GroceryRecord =
            serde_json::from_str(r#"{"Id":"a1","Name":"Eggs"}"#).unwrap();
        let item = GroceryItem::from_record(ItemKey(3), record);
        assert_eq!(item.id, "a1");
        assert_eq!(item.name, "Eggs");
        assert!(!item.done);
        assert!(!item.deleted);
    }

    #[test]
    fn test_delete_clears_done() {
        let item = GroceryItem::new(ItemKey(1), "Bread").with_done_toggled();
        assert!(item.done);

        let deleted = item.with_deleted();
        assert!(deleted.deleted);
        assert!(!deleted.done);
        assert_eq!(deleted.key, item.key);
        assert_eq!(deleted.name, "Bread");
    }

    #[test]
    fn test_restorable_needs_both_flags() {
        let mut item = GroceryItem::new(ItemKey(1), "Tea");
        item.deleted = true;
        assert!(!item.is_restorable());
        item.done = true;
        assert!(item.is_restorable());

        let restored = item.with_restored();
        assert!(!restored.deleted);
        assert!(!restored.done);
    }
}
