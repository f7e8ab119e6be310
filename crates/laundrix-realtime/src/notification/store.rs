//! De-duplicating, ordered notification store with derived statistics.
//!
//! The store is the single source of truth for notification UI state and
//! has no side effects: alerting, logging of user-facing failures, and
//! REST calls all happen in the callers.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use laundrix_core::types::NotificationId;

use super::model::Notification;
use super::priority::Priority;

/// Aggregate counts derived from the store contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    /// Number of stored notifications.
    pub total: usize,
    /// Number of unread notifications.
    pub unread: usize,
    /// Count per priority level; every level is always present.
    pub by_priority: BTreeMap<Priority, usize>,
}

impl NotificationStats {
    /// Pure fold over a collection.
    pub fn from_notifications<'a>(items: impl IntoIterator<Item = &'a Notification>) -> Self {
        let mut stats = Self::default();
        for n in items {
            stats.total += 1;
            if !n.is_read {
                stats.unread += 1;
            }
            *stats.by_priority.entry(n.priority).or_insert(0) += 1;
        }
        stats
    }

    /// Count for one priority level.
    pub fn count(&self, priority: Priority) -> usize {
        self.by_priority.get(&priority).copied().unwrap_or(0)
    }
}

impl Default for NotificationStats {
    fn default() -> Self {
        Self {
            total: 0,
            unread: 0,
            by_priority: Priority::ALL.into_iter().map(|p| (p, 0)).collect(),
        }
    }
}

/// Ordered collection of notifications, most recent first, at most one
/// record per id.
#[derive(Debug, Default)]
pub struct NotificationStore {
    items: Vec<Notification>,
    ids: HashSet<NotificationId>,
    stats: NotificationStats,
}

impl NotificationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a notification unless one with the same id is already held.
    ///
    /// Returns `true` if the notification was added.
    pub fn ingest(&mut self, notification: Notification) -> bool {
        if self.ids.contains(&notification.id) {
            tracing::debug!(notification_id = %notification.id, "Duplicate notification ignored");
            return false;
        }
        self.ids.insert(notification.id.clone());
        self.items.insert(0, notification);
        self.recompute();
        true
    }

    /// Mark one notification read. Returns `true` if a record matched.
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        let Some(n) = self.items.iter_mut().find(|n| &n.id == id) else {
            return false;
        };
        n.is_read = true;
        self.recompute();
        true
    }

    /// Mark every notification read. Returns how many changed state.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for n in self.items.iter_mut().filter(|n| !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        self.recompute();
        changed
    }

    /// Record a confirmed acknowledgment; an acknowledged notification is
    /// also considered read. Returns `true` if a record matched.
    pub fn mark_acknowledged(&mut self, id: &NotificationId) -> bool {
        let Some(n) = self.items.iter_mut().find(|n| &n.id == id) else {
            return false;
        };
        n.acknowledged = true;
        n.is_read = true;
        self.recompute();
        true
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
        self.recompute();
    }

    /// Replace the contents with `list`, keeping the first occurrence of
    /// each id, ordered most recent first.
    pub fn hydrate(&mut self, list: Vec<Notification>) {
        self.items.clear();
        self.ids.clear();
        for n in list {
            if self.ids.insert(n.id.clone()) {
                self.items.push(n);
            }
        }
        // stable: equal timestamps keep server order
        self.items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.recompute();
    }

    /// Look up one notification.
    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.items.iter().find(|n| &n.id == id)
    }

    /// Whether a notification with this id is held.
    pub fn contains(&self, id: &NotificationId) -> bool {
        self.ids.contains(id)
    }

    /// All notifications, most recent first.
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// Current statistics.
    pub fn stats(&self) -> &NotificationStats {
        &self.stats
    }

    /// Number of stored notifications.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn recompute(&mut self) {
        self.stats = NotificationStats::from_notifications(&self.items);
    }
}
