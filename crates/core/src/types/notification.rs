//! Account notifications and the read/unread feed.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::NotificationId;

/// A notification shown on the account dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// The dashboard's notification list plus reads made locally.
///
/// Reads are optimistic: a notification marked read here stays read even if
/// the next poll still reports it unread (the service call may not have
/// landed yet). There is no way back to unread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFeed {
    items: Vec<Notification>,
    locally_read: BTreeSet<NotificationId>,
}

impl NotificationFeed {
    /// Build a feed from fetched notifications and ids already read locally.
    #[must_use]
    pub fn new(items: Vec<Notification>, locally_read: impl IntoIterator<Item = NotificationId>) -> Self {
        let mut feed = Self {
            items: Vec::new(),
            locally_read: locally_read.into_iter().collect(),
        };
        feed.merge(items);
        feed
    }

    /// Mark one notification read. Returns `true` if anything changed.
    ///
    /// Marking the same notification a second time is a no-op.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        let newly_recorded = self.locally_read.insert(id);
        let mut flipped = false;
        for item in self.items.iter_mut().filter(|n| n.id == id) {
            flipped |= !item.is_read;
            item.is_read = true;
        }
        newly_recorded || flipped
    }

    /// Mark every notification read. Returns the ids that flipped.
    pub fn mark_all_read(&mut self) -> Vec<NotificationId> {
        let flipped: Vec<NotificationId> = self
            .items
            .iter()
            .filter(|n| !n.is_read)
            .map(|n| n.id)
            .collect();
        for id in &flipped {
            self.mark_read(*id);
        }
        flipped
    }

    /// Replace the list with freshly polled data, keeping local reads.
    ///
    /// Returns `true` if the visible feed changed.
    pub fn merge(&mut self, incoming: Vec<Notification>) -> bool {
        let merged: Vec<Notification> = incoming
            .into_iter()
            .map(|mut n| {
                if self.locally_read.contains(&n.id) {
                    n.is_read = true;
                }
                n
            })
            .collect();
        let changed = merged != self.items;
        self.items = merged;
        changed
    }

    /// Notifications, newest first as delivered by the service.
    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Ids read locally (persisted in the session between requests).
    pub fn locally_read(&self) -> impl Iterator<Item = NotificationId> + '_ {
        self.locally_read.iter().copied()
    }

    /// Number of unread notifications.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: i64, is_read: bool) -> Notification {
        Notification {
            id: NotificationId::new(id),
            title: format!("Order update {id}"),
            message: "Your order has shipped from Dubai".to_string(),
            is_read,
            created_at: DateTime::<Utc>::default(),
        }
    }

    #[test]
    fn test_mark_read_is_idempotent() {
        let mut feed = NotificationFeed::new(vec![note(1, false), note(2, false)], []);
        assert_eq!(feed.unread_count(), 2);

        assert!(feed.mark_read(NotificationId::new(1)));
        let after_first = feed.clone();
        assert!(!feed.mark_read(NotificationId::new(1)));
        assert_eq!(feed, after_first);
        assert_eq!(feed.unread_count(), 1);
    }

    #[test]
    fn test_mark_read_on_already_read_item() {
        let mut feed = NotificationFeed::new(vec![note(1, true)], []);
        // Recorded locally the first time, nothing visible changes.
        assert!(feed.mark_read(NotificationId::new(1)));
        assert!(!feed.mark_read(NotificationId::new(1)));
        assert!(feed.items().iter().all(|n| n.is_read));
    }

    #[test]
    fn test_merge_keeps_local_reads() {
        let mut feed = NotificationFeed::new(vec![note(1, false), note(2, false)], []);
        feed.mark_read(NotificationId::new(2));

        // Poll still says unread for 2, and brings a new notification 3.
        let changed = feed.merge(vec![note(3, false), note(1, false), note(2, false)]);
        assert!(changed);
        let read: Vec<bool> = feed.items().iter().map(|n| n.is_read).collect();
        assert_eq!(read, vec![false, false, true]);
        assert_eq!(feed.unread_count(), 2);
    }

    #[test]
    fn test_merge_reports_no_change() {
        let mut feed = NotificationFeed::new(vec![note(1, false)], []);
        assert!(!feed.merge(vec![note(1, false)]));
    }

    #[test]
    fn test_new_applies_session_reads() {
        let feed = NotificationFeed::new(vec![note(1, false), note(2, false)], [NotificationId::new(1)]);
        assert_eq!(feed.unread_count(), 1);
        assert_eq!(feed.locally_read().collect::<Vec<_>>(), vec![NotificationId::new(1)]);
    }

    #[test]
    fn test_mark_all_read() {
        let mut feed = NotificationFeed::new(vec![note(1, false), note(2, true), note(3, false)], []);
        let flipped = feed.mark_all_read();
        assert_eq!(flipped, vec![NotificationId::new(1), NotificationId::new(3)]);
        assert_eq!(feed.unread_count(), 0);
        assert!(feed.mark_all_read().is_empty());
    }
}
