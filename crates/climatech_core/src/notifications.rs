//! crates/climatech_core/src/notifications.rs
//!
//! Read/unread bookkeeping for the notification tray.

use crate::domain::{Notification, NotificationCategory};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Default)]
pub struct NotificationLedger {
    entries: Vec<Notification>,
}

impl NotificationLedger {
    pub fn new(entries: Vec<Notification>) -> Self {
        Self { entries }
    }

    /// The notices every session starts with.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self::new(vec![
            Notification {
                id: "1".to_string(),
                title: "Weather Alert".to_string(),
                body: "Heavy rainfall expected in Metro Manila area. Stay safe and avoid flood-prone areas.".to_string(),
                category: NotificationCategory::Alert,
                created_at: now - Duration::minutes(30),
                read: false,
            },
            Notification {
                id: "2".to_string(),
                title: "System Update".to_string(),
                body: "ClimaTech AI has been updated with improved weather prediction algorithms.".to_string(),
                category: NotificationCategory::System,
                created_at: now - Duration::hours(2),
                read: false,
            },
        ])
    }

    /// Marks the matching notice as read. Returns `true` only when a flag
    /// actually flipped; unknown ids and repeat calls are ignored.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|n| n.id == id) {
            Some(entry) if !entry.read => {
                entry.read = true;
                true
            }
            _ => false,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.entries.iter().filter(|n| !n.read).count()
    }

    /// Ingests a new notice. A notice reusing an existing id is dropped.
    pub fn push(&mut self, notification: Notification) -> bool {
        if self.entries.iter().any(|n| n.id == notification.id) {
            return false;
        }
        self.entries.push(notification);
        true
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn marking_twice_only_counts_once() {
        let mut ledger = NotificationLedger::seeded(Utc::now());
        assert_eq!(ledger.unread_count(), 2);
        assert!(ledger.mark_read("1"));
        assert!(!ledger.mark_read("1"));
        assert_eq!(ledger.unread_count(), 1);
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut ledger = NotificationLedger::seeded(Utc::now());
        assert!(!ledger.mark_read("does-not-exist"));
        assert_eq!(ledger.unread_count(), 2);
    }

    #[test]
    fn pushed_notice_starts_unread() {
        let now = Utc::now();
        let mut ledger = NotificationLedger::seeded(now);
        assert!(ledger.push(Notification {
            id: "typhoon-1".to_string(),
            title: "Typhoon Watch".to_string(),
            body: "Signal No. 1 raised over Caraga.".to_string(),
            category: NotificationCategory::Weather,
            created_at: now,
            read: false,
        }));
        assert_eq!(ledger.unread_count(), 3);
        let duplicate = ledger.entries()[0].clone();
        assert!(!ledger.push(duplicate));
    }

    proptest! {
        #[test]
        fn unread_count_tracks_distinct_known_ids(ids in proptest::collection::vec(prop_oneof![Just("1"), Just("2"), Just("3"), Just("x")], 0..12)) {
            let mut ledger = NotificationLedger::seeded(Utc::now());
            let seed_size = ledger.entries().len();
            for id in &ids {
                ledger.mark_read(id);
            }
            let distinct_known: HashSet<&str> = ids.iter().copied().filter(|id| *id == "1" || *id == "2").collect();
            prop_assert_eq!(ledger.unread_count(), seed_size - distinct_known.len().min(seed_size));
        }
    }
}
