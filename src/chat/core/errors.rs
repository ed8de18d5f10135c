//! Error types for the chat core.

use thiserror::Error;

use crate::chat::core::ids::SessionId;

/// Chat core error type.
///
/// Store-level "not found" conditions are not errors: appends to a missing
/// session degrade to [`AppendOutcome::SessionNotFound`]. The variants here
/// are raised at the presentation boundary only.
///
/// [`AppendOutcome::SessionNotFound`]: crate::chat::store::AppendOutcome::SessionNotFound
#[derive(Debug, Error)]
pub enum ChatError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Session name was empty after trimming.
    #[error("session name must not be empty")]
    EmptyName,
    /// Message content was empty after trimming.
    #[error("message content must not be empty")]
    EmptyMessage,
    /// An operation needed an active session but none is selected.
    #[error("no active session")]
    NoActiveSession,
    /// The referenced session does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    /// A counterpart reply is still outstanding for the session.
    #[error("a reply is still pending for session {0}")]
    ReplyPending(SessionId),
    /// A component that spawns timer tasks was created outside a Tokio runtime.
    #[error("no Tokio runtime is running on this thread")]
    NoRuntime,
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Trim `raw` and return it when something is left.
///
/// This is the boundary check applied to session names and message bodies
/// before they reach the store.
#[must_use]
pub fn non_empty_trimmed(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
