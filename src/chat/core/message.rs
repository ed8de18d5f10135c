//! Chat message model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::chat::core::ids::MessageId;

/// Who wrote a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    /// The local user.
    User,
    /// The simulated counterpart.
    Counterpart,
}

impl Author {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Counterpart => "counterpart",
        }
    }

    /// Whether the message came from the local user.
    #[must_use]
    pub const fn is_user(self) -> bool {
        matches!(self, Self::User)
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Author {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "counterpart" => Ok(Self::Counterpart),
            _ => Err(value.to_string()),
        }
    }
}

/// A single immutable chat message.
///
/// Fields are private; a message never changes after the log creates it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    content: String,
    created_at: DateTime<Utc>,
    author: Author,
}

impl Message {
    pub(crate) const fn new(
        id: MessageId,
        content: String,
        created_at: DateTime<Utc>,
        author: Author,
    ) -> Self {
        Self {
            id,
            content,
            created_at,
            author,
        }
    }

    /// Message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Message text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation timestamp, strictly increasing within one log.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Message author.
    #[must_use]
    pub const fn author(&self) -> Author {
        self.author
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_str_forms() {
        assert_eq!(Author::User.as_str(), "user");
        assert_eq!(Author::Counterpart.to_string(), "counterpart");
        assert_eq!("counterpart".parse::<Author>(), Ok(Author::Counterpart));
        assert_eq!("bot".parse::<Author>(), Err("bot".to_string()));
        assert!(Author::User.is_user());
        assert!(!Author::Counterpart.is_user());
    }

    #[test]
    fn test_message_serializes_author_snake_case() {
        let msg = Message::new(MessageId::new(), "hi".into(), Utc::now(), Author::Counterpart);
        let json = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(json["author"], "counterpart");
        assert_eq!(json["content"], "hi");
    }
}
