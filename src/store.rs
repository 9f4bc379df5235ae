//! Snapshot Publishing
//!
//! The list manager hands every post-mutation copy of its list to a
//! `SnapshotPublisher`. Where the snapshot is delivered (a UI thread, a
//! render task, a test) is decided by whoever injects the publisher.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};

use crate::domain::GroceryItem;

/// Receives a fresh copy of the list after every change
pub trait SnapshotPublisher: Send + Sync {
    fn publish(&self, snapshot: Vec<GroceryItem>);
}

/// Latest-state channel: subscribers see the newest list, intermediate
/// snapshots may be skipped
pub struct WatchPublisher {
    tx: watch::Sender<Arc<Vec<GroceryItem>>>,
}

impl WatchPublisher {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(Vec::new()));
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<GroceryItem>>> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Arc<Vec<GroceryItem>> {
        self.tx.borrow().clone()
    }
}

impl Default for WatchPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher for WatchPublisher {
    fn publish(&self, snapshot: Vec<GroceryItem>) {
        self.tx.send_replace(Arc::new(snapshot));
    }
}

/// Every snapshot, in order, delivered to a single consumer task
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<Vec<GroceryItem>>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<GroceryItem>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SnapshotPublisher for ChannelPublisher {
    fn publish(&self, snapshot: Vec<GroceryItem>) {
        if self.tx.send(snapshot).is_err() {
            log::debug!("snapshot dropped, consumer is gone");
        }
    }
}

// ========================
// List Views
// ========================

/// Entries still on the list, in list order
pub fn active(items: &[GroceryItem]) -> Vec<GroceryItem> {
    items.iter().filter(|item| !item.deleted).cloned().collect()
}

/// Soft-deleted entries, in list order
pub fn recently_deleted(items: &[GroceryItem]) -> Vec<GroceryItem> {
    items.iter().filter(|item| item.deleted).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ItemKey;

    fn sample() -> Vec<GroceryItem> {
        vec![
            GroceryItem::new(ItemKey(3), "Cheese"),
            GroceryItem::new(ItemKey(2), "Jam").with_deleted(),
            GroceryItem::new(ItemKey(1), "Oats"),
        ]
    }

    #[test]
    fn test_views_split_by_deleted() {
        let items = sample();
        let names = |v: Vec<GroceryItem>| v.into_iter().map(|i| i.name).collect::<Vec<_>>();

        assert_eq!(names(active(&items)), vec!["Cheese", "Oats"]);
        assert_eq!(names(recently_deleted(&items)), vec!["Jam"]);
    }

    #[tokio::test]
    async fn test_watch_publisher_keeps_latest() {
        let publisher = WatchPublisher::new();
        let mut rx = publisher.subscribe();
        assert!(publisher.latest().is_empty());

        publisher.publish(sample());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().len(), 3);
        assert_eq!(publisher.latest().len(), 3);
    }

    #[tokio::test]
    async fn test_channel_publisher_delivers_in_order() {
        let (publisher, mut rx) = ChannelPublisher::new();
        publisher.publish(Vec::new());
        publisher.publish(sample());

        assert_eq!(rx.recv().await.unwrap().len(), 0);
        assert_eq!(rx.recv().await.unwrap().len(), 3);
    }

    #[test]
    fn test_channel_publisher_survives_closed_consumer() {
        let (publisher, rx) = ChannelPublisher::new();
        drop(rx);
        publisher.publish(sample());
    }
}
