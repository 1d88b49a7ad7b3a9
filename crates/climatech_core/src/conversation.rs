//! crates/climatech_core/src/conversation.rs
//!
//! The ordered, append-only conversation log and its history rewind.

use crate::domain::{Location, Message, Role};
use crate::responses;
use chrono::{DateTime, Utc};

/// Id of the greeting every fresh log starts with.
pub const SEED_MESSAGE_ID: &str = "1";

/// Hands out message ids derived from the creation time in milliseconds.
/// Two messages created in the same millisecond still get distinct,
/// increasing ids.
#[derive(Debug, Clone, Default)]
struct MessageIdSource {
    last: i64,
}

/// Restored ids above this are opaque to the generator and never raise its floor.
const MAX_TRACKED_ID: i64 = i64::MAX / 2;

impl MessageIdSource {
    fn after(messages: &[Message]) -> Self {
        let last = messages
            .iter()
            .filter_map(|m| m.id.parse::<i64>().ok())
            .filter(|id| *id <= MAX_TRACKED_ID)
            .max()
            .unwrap_or(0);
        Self { last }
    }

    fn next(&mut self, at: DateTime<Utc>) -> String {
        self.last = at.timestamp_millis().max(self.last.saturating_add(1));
        self.last.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ConversationLog {
    messages: Vec<Message>,
    ids: MessageIdSource,
}

impl ConversationLog {
    /// A log holding only the greeting.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let messages = vec![Message::bot(SEED_MESSAGE_ID, responses::GREETING, now)];
        Self {
            ids: MessageIdSource::after(&messages),
            messages,
        }
    }

    /// Restores a log from a previous snapshot. Returns `None` for an empty one.
    pub fn from_messages(messages: Vec<Message>) -> Option<Self> {
        if messages.is_empty() {
            return None;
        }
        let ids = MessageIdSource::after(&messages);
        Some(Self { messages, ids })
    }

    pub fn append(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Builds a message with a fresh id and appends it.
    pub fn append_new(
        &mut self,
        role: Role,
        body: impl Into<String>,
        location: Option<Location>,
        at: DateTime<Utc>,
    ) -> Message {
        let id = self.ids.next(at);
        let mut message = match role {
            Role::User => Message::user(id, body, at),
            Role::Bot => Message::bot(id, body, at),
        };
        message.location = location;
        self.append(message).clone()
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Replaces the whole log with `prefix`. An empty prefix leaves the log
    /// untouched and returns `false`.
    pub fn load_branch(&mut self, prefix: Vec<Message>) -> bool {
        if prefix.is_empty() {
            return false;
        }
        let floor = self.ids.last;
        self.ids = MessageIdSource::after(&prefix);
        // Ids stay unique across rewinds even if the branch dropped the newest ones.
        self.ids.last = self.ids.last.max(floor);
        self.messages = prefix;
        true
    }

    /// The history up to and including the message with `id`.
    pub fn prefix_through(&self, id: &str) -> Option<Vec<Message>> {
        let index = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages[..=index].to_vec())
    }
}
