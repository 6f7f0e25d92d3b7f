//! In-process notification center
//!
//! Process-scoped service constructed at startup and injected through
//! `AppState`. Holds the most recent notifications in a bounded ring,
//! newest first. Not persisted; a restart clears it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use shared::models::Notification;

/// Ring capacity; older entries are dropped
const MAX_NOTIFICATIONS: usize = 100;

#[derive(Clone, Default)]
pub struct NotificationCenter {
    inner: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notification, evicting the oldest when at capacity
    pub fn push(&self, notification: Notification) {
        let mut ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if ring.len() == MAX_NOTIFICATIONS {
            ring.pop_back();
        }
        ring.push_front(notification);
    }

    /// All retained notifications, newest first
    pub fn list(&self) -> Vec<Notification> {
        let ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        ring.iter().cloned().collect()
    }

    /// Mark a notification read; false when the id is unknown (already
    /// evicted or never existed)
    pub fn mark_read(&self, id: &str) -> bool {
        let mut ring = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        match ring.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Severity;

    fn note(title: &str) -> Notification {
        Notification::new(title, "msg", Severity::Warning, None)
    }

    #[test]
    fn newest_first_ordering() {
        let center = NotificationCenter::new();
        center.push(note("first"));
        center.push(note("second"));
        let all = center.list();
        assert_eq!(all[0].title, "second");
        assert_eq!(all[1].title, "first");
    }

    #[test]
    fn ring_evicts_oldest() {
        let center = NotificationCenter::new();
        for i in 0..(MAX_NOTIFICATIONS + 5) {
            center.push(note(&format!("n{i}")));
        }
        let all = center.list();
        assert_eq!(all.len(), MAX_NOTIFICATIONS);
        assert_eq!(all[0].title, format!("n{}", MAX_NOTIFICATIONS + 4));
        // the five oldest are gone
        assert!(all.iter().all(|n| n.title != "n0" && n.title != "n4"));
    }

    #[test]
    fn mark_read_by_id() {
        let center = NotificationCenter::new();
        let n = note("unread");
        let id = n.id.clone();
        center.push(n);

        assert!(center.mark_read(&id));
        assert!(center.list()[0].read);
        assert!(!center.mark_read("no-such-id"));
    }
}
