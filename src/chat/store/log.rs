//! Append-only message log for one session.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::chat::core::ids::MessageId;
use crate::chat::core::message::{Author, Message};

/// Ordered, append-only sequence of messages.
///
/// Messages are only ever pushed to the end; there is no way to remove or
/// edit one. Timestamps are strictly increasing: when the wall clock has not
/// moved past the previous message, the new one is stamped one microsecond
/// later.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// Create an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Append a message and return its identifier.
    pub fn append(&mut self, content: impl Into<String>, author: Author) -> MessageId {
        let id = MessageId::new();
        let created_at = self.next_timestamp(Utc::now());
        self.messages
            .push(Message::new(id, content.into(), created_at, author));
        id
    }

    fn next_timestamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.messages.last() {
            Some(prev) if now <= prev.created_at() => {
                prev.created_at() + TimeDelta::microseconds(1)
            }
            _ => now,
        }
    }

    /// All messages in append order.
    #[must_use]
    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }

    /// Iterate messages in append order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Most recent message, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<'a> IntoIterator for &'a MessageLog {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_call_order() {
        let mut log = MessageLog::new();
        let ids: Vec<MessageId> = (0..50)
            .map(|i| log.append(format!("m{i}"), Author::User))
            .collect();

        let got: Vec<MessageId> = log.iter().map(Message::id).collect();
        assert_eq!(got, ids);
        assert_eq!(log.len(), 50);
        assert_eq!(log.last().map(Message::content), Some("m49"));
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let mut log = MessageLog::new();
        for i in 0..200 {
            log.append(i.to_string(), Author::Counterpart);
        }
        assert!(
            log.as_slice()
                .windows(2)
                .all(|pair| pair[0].created_at() < pair[1].created_at())
        );
    }

    #[test]
    fn test_clock_going_backwards_still_increases() {
        let mut log = MessageLog::new();
        log.append("first", Author::User);
        let first = log.as_slice()[0].created_at();
        let earlier = first - TimeDelta::seconds(5);
        assert_eq!(
            log.next_timestamp(earlier),
            first + TimeDelta::microseconds(1)
        );
    }

    #[test]
    fn test_empty_log() {
        let log = MessageLog::default();
        assert!(log.is_empty());
        assert!(log.last().is_none());
    }
}
