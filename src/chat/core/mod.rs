//! Core chat types and identifiers.

pub mod config;
pub mod errors;
pub mod ids;
pub mod message;

pub use config::{
    ChatConfig, MESSAGE_PLACEHOLDER, ReplyConfig, SearchConfig, SendPolicy, ViewConfig,
};
pub use errors::{ChatError, ChatResult, non_empty_trimmed};
pub use ids::{MessageId, SessionId};
pub use message::{Author, Message};
