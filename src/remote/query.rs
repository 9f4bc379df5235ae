//! Remote Query Types
//!
//! Structured sort / filter / patch directives. The manager builds them and
//! passes them through untouched; each store translates them into its own
//! dialect.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::GroceryRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    ModifiedAt,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering requested from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Most recently modified first
    pub fn modified_desc() -> Self {
        Self {
            field: SortField::ModifiedAt,
            direction: SortDirection::Descending,
        }
    }

    /// Compare two records under this ordering
    ///
    /// Records without a modification time sort as oldest.
    pub fn compare(&self, a: &GroceryRecord, b: &GroceryRecord) -> Ordering {
        let ord = match self.field {
            SortField::ModifiedAt => a.modified_at.cmp(&b.modified_at),
            SortField::Name => a.name.cmp(&b.name),
        };
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Record selection for bulk updates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// `Id ∈ {ids}`
    IdIn(Vec<String>),
}

impl Filter {
    pub fn matches(&self, record: &GroceryRecord) -> bool {
        match self {
            Filter::IdIn(ids) => ids.iter().any(|id| *id == record.id),
        }
    }
}

/// Field assignments applied by a bulk update; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FlagPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl FlagPatch {
    /// `Deleted = false, Done = false`
    pub fn restored() -> Self {
        Self {
            done: Some(false),
            deleted: Some(false),
        }
    }

    pub fn apply(&self, record: &mut GroceryRecord) {
        if let Some(done) = self.done {
            record.done = Some(done);
        }
        if let Some(deleted) = self.deleted {
            record.deleted = Some(deleted);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_modified_desc_puts_newest_first() {
        let now = Utc::now();
        let mut old = GroceryRecord::new("1", "Old");
        old.modified_at = Some(now - Duration::seconds(10));
        let mut new = GroceryRecord::new("2", "New");
        new.modified_at = Some(now);
        let never = GroceryRecord::new("3", "Never");

        let mut records = vec![old, never, new];
        let sort = SortSpec::modified_desc();
        records.sort_by(|a, b| sort.compare(a, b));

        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn test_filter_and_patch() {
        let filter = Filter::IdIn(vec!["a".to_string()]);
        let mut a = GroceryRecord::new("a", "Apples");
        a.done = Some(true);
        a.deleted = Some(true);
        let b = GroceryRecord::new("b", "Bananas");

        assert!(filter.matches(&a));
        assert!(!filter.matches(&b));

        FlagPatch::restored().apply(&mut a);
        assert_eq!(a.done, Some(false));
        assert_eq!(a.deleted, Some(false));
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let patch = FlagPatch {
            done: None,
            deleted: Some(true),
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"Deleted":true}"#);
    }
}
