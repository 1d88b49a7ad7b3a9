//! crates/climatech_core/src/persistence.rs
//!
//! Snapshot storage for the conversation log. The whole log is written under a
//! single key after every mutation and read back once at startup.

use crate::conversation::ConversationLog;
use crate::domain::Message;
use crate::ports::SessionStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// The single slot the session snapshot lives in.
pub const SESSION_KEY: &str = "climatech-messages";

/// Serializes the log as a JSON array with RFC 3339 timestamps.
pub fn encode_snapshot(messages: &[Message]) -> Result<String, serde_json::Error> {
    serde_json::to_string(messages)
}

/// Parses a stored snapshot. Malformed or empty input yields `None`.
pub fn decode_snapshot(raw: &str) -> Option<Vec<Message>> {
    match serde_json::from_str::<Vec<Message>>(raw) {
        Ok(messages) if !messages.is_empty() => Some(messages),
        Ok(_) => None,
        Err(e) => {
            warn!("Discarding malformed session snapshot: {}", e);
            None
        }
    }
}

#[derive(Clone)]
pub struct SessionPersistence {
    store: Arc<dyn SessionStore>,
}

impl SessionPersistence {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Restores the log, reseeding with the greeting whenever the stored value
    /// is missing, unreadable or empty.
    pub async fn load(&self, now: DateTime<Utc>) -> ConversationLog {
        let raw = match self.store.load(SESSION_KEY).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read session snapshot, starting fresh: {}", e);
                None
            }
        };
        match raw.as_deref().and_then(decode_snapshot).and_then(ConversationLog::from_messages) {
            Some(log) => {
                debug!(messages = log.len(), "Restored session snapshot");
                log
            }
            None => ConversationLog::seeded(now),
        }
    }

    /// Overwrites the stored snapshot with the full log. Failures are logged
    /// and swallowed; the in-memory log stays authoritative.
    pub async fn write(&self, log: &ConversationLog) {
        let encoded = match encode_snapshot(log.snapshot()) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode session snapshot: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.save(SESSION_KEY, &encoded).await {
            warn!("Failed to persist session snapshot: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::SEED_MESSAGE_ID;
    use crate::domain::{Coordinates, Location, Role};
    use crate::testing::MemoryStore;

    #[test]
    fn snapshot_uses_the_browser_storage_layout() {
        let at = DateTime::parse_from_rfc3339("2025-06-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let message = Message::user("1717228800000", "hi", at);
        let encoded = encode_snapshot(&[message]).unwrap();
        assert_eq!(
            encoded,
            r#"[{"id":"1717228800000","type":"user","content":"hi","timestamp":"2025-06-01T08:00:00Z"}]"#
        );
    }

    #[test]
    fn decodes_iso_timestamps_and_locations() {
        let raw = r#"[{"id":"9","type":"bot","content":"x","timestamp":"2025-06-01T08:00:00.123Z","location":{"lat":8.95,"lng":125.54,"name":"Butuan"}}]"#;
        let messages = decode_snapshot(raw).unwrap();
        assert_eq!(messages[0].role, Role::Bot);
        assert_eq!(messages[0].created_at.timestamp_subsec_millis(), 123);
        assert_eq!(
            messages[0].location,
            Some(Location::new(Coordinates::new(8.95, 125.54), "Butuan"))
        );
    }

    #[test]
    fn malformed_and_empty_snapshots_are_rejected() {
        assert!(decode_snapshot("not json").is_none());
        assert!(decode_snapshot(r#"[{"id":"1"}]"#).is_none());
        assert!(decode_snapshot("[]").is_none());
    }

    #[tokio::test]
    async fn absent_or_malformed_value_reseeds_the_log() {
        let store = Arc::new(MemoryStore::default());
        let persistence = SessionPersistence::new(store.clone());
        let log = persistence.load(Utc::now()).await;
        assert_eq!(log.len(), 1);
        assert_eq!(log.snapshot()[0].id, SEED_MESSAGE_ID);

        store.put(SESSION_KEY, "{broken");
        let log = persistence.load(Utc::now()).await;
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn written_log_is_restored() {
        let store = Arc::new(MemoryStore::default());
        let persistence = SessionPersistence::new(store.clone());
        let mut log = ConversationLog::seeded(Utc::now());
        log.append_new(Role::User, "What's the weather today?", None, Utc::now());
        persistence.write(&log).await;

        let restored = persistence.load(Utc::now()).await;
        assert_eq!(restored.snapshot(), log.snapshot());
        assert_eq!(store.writes(), 1);
    }
}
