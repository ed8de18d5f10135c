//! In-memory session store.
//!
//! Owns every session, keeps them in creation order and tracks which one is
//! active. All operations are synchronous and complete before returning, so a
//! reader always sees the result of the last mutation.

use serde::Serialize;
use tracing::{debug, info};

use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::ids::{MessageId, SessionId};
use crate::chat::core::message::Author;
use crate::chat::store::log::MessageLog;

/// One conversation thread with its own message log.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    id: SessionId,
    name: String,
    messages: MessageLog,
}

impl Session {
    fn new(name: String) -> Self {
        Self {
            id: SessionId::new(),
            name,
            messages: MessageLog::new(),
        }
    }

    /// Session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Message log.
    #[must_use]
    pub const fn messages(&self) -> &MessageLog {
        &self.messages
    }
}

/// Result of appending to a session that may have been deleted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use]
pub enum AppendOutcome {
    /// The message was appended.
    Appended(MessageId),
    /// The session no longer exists; nothing happened.
    SessionNotFound,
}

impl AppendOutcome {
    /// Identifier of the appended message, if any.
    #[must_use]
    pub const fn message_id(self) -> Option<MessageId> {
        match self {
            Self::Appended(id) => Some(id),
            Self::SessionNotFound => None,
        }
    }
}

/// Set of sessions plus the active-session selector.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionStore {
    sessions: Vec<Session>,
    active: Option<SessionId>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sessions: Vec::new(),
            active: None,
        }
    }

    /// Create an empty session and return its id.
    ///
    /// The name is stored as given; callers trim and reject blank names.
    /// The active selection is left untouched.
    pub fn create_session(&mut self, name: impl Into<String>) -> SessionId {
        let session = Session::new(name.into());
        let id = session.id;
        info!(session_id = %id, name = %session.name, "Created session");
        self.sessions.push(session);
        id
    }

    /// Delete a session. Returns `false` if it did not exist.
    ///
    /// Deleting the active session clears the selection.
    pub fn delete_session(&mut self, id: SessionId) -> bool {
        let Some(index) = self.position(id) else {
            debug!(session_id = %id, "Delete ignored, session not found");
            return false;
        };
        self.sessions.remove(index);
        if self.active == Some(id) {
            self.active = None;
        }
        info!(session_id = %id, "Deleted session");
        true
    }

    /// Rename a session. Returns `false` if it did not exist.
    pub fn rename_session(&mut self, id: SessionId, name: impl Into<String>) -> bool {
        let Some(session) = self.session_mut(id) else {
            return false;
        };
        session.name = name.into();
        debug!(session_id = %id, name = %session.name, "Renamed session");
        true
    }

    /// Select the active session, or clear the selection with `None`.
    ///
    /// # Errors
    /// Returns [`ChatError::SessionNotFound`] if `id` is not in the store; the
    /// previous selection is kept.
    pub fn set_active_session(&mut self, id: Option<SessionId>) -> ChatResult<()> {
        if let Some(missing) = id.filter(|&candidate| !self.contains(candidate)) {
            return Err(ChatError::SessionNotFound(missing));
        }
        self.active = id;
        Ok(())
    }

    /// Append a message to a session.
    ///
    /// Appending to a missing session is a no-op that reports
    /// [`AppendOutcome::SessionNotFound`]; it never recreates the session.
    pub fn append_message(
        &mut self,
        session_id: SessionId,
        content: impl Into<String>,
        author: Author,
    ) -> AppendOutcome {
        let Some(session) = self.session_mut(session_id) else {
            debug!(%session_id, %author, "Append dropped, session not found");
            return AppendOutcome::SessionNotFound;
        };
        let id = session.messages.append(content, author);
        debug!(
            %session_id,
            message_id = %id,
            %author,
            len = session.messages.len(),
            "Appended message"
        );
        AppendOutcome::Appended(id)
    }

    /// Look up a session.
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn session_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }

    /// All sessions in creation order.
    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Whether a session exists.
    #[must_use]
    pub fn contains(&self, id: SessionId) -> bool {
        self.position(id).is_some()
    }

    /// Active session id, resolved against the current set of sessions.
    #[must_use]
    pub fn active_session_id(&self) -> Option<SessionId> {
        self.active_session().map(Session::id)
    }

    /// Active session, or `None` if nothing (existing) is selected.
    #[must_use]
    pub fn active_session(&self) -> Option<&Session> {
        self.active.and_then(|id| self.session(id))
    }

    /// Number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
