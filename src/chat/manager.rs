//! Presentation-boundary facade.
//!
//! `ChatManager` is what a UI talks to. It validates raw input, forwards to
//! the store, arms counterpart replies, keeps the view window in step with
//! the active session and owns the search box. Every call is synchronous and
//! the caller re-reads state (or takes a [`ChatSnapshot`]) afterwards.

use serde::Serialize;
use tracing::{debug, info};

use crate::chat::core::config::{ChatConfig, SendPolicy};
use crate::chat::core::errors::{ChatError, ChatResult, non_empty_trimmed};
use crate::chat::core::ids::SessionId;
use crate::chat::core::message::{Author, Message};
use crate::chat::reply::{ReplyScheduler, ReplyTicket};
use crate::chat::search::{AppliedQuery, SearchFilter};
use crate::chat::store::{AppendOutcome, Session, SessionStore, SharedStore};
use crate::chat::view::{self, ViewWindow};

/// Sidebar entry for one session.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub id: SessionId,
    /// Display name.
    pub name: String,
    /// Number of messages in the log.
    pub message_count: usize,
    /// Content of the newest message, if any.
    pub last_message: Option<String>,
}

impl SessionSummary {
    fn from_session(session: &Session) -> Self {
        Self {
            id: session.id(),
            name: session.name().to_string(),
            message_count: session.messages().len(),
            last_message: session.messages().last().map(|m| m.content().to_string()),
        }
    }
}

/// Visible state of the active session.
#[derive(Clone, Debug, Serialize)]
pub struct ActiveView {
    /// Session identifier.
    pub id: SessionId,
    /// Display name.
    pub name: String,
    /// Messages inside the view window, oldest first.
    pub messages: Vec<Message>,
    /// Whether older messages can be loaded.
    pub has_more: bool,
    /// Whether a counterpart reply is outstanding.
    pub is_replying: bool,
}

/// Everything a UI needs to render one frame.
#[derive(Clone, Debug, Serialize)]
pub struct ChatSnapshot {
    /// Sessions matching the applied search query, in creation order.
    pub sessions: Vec<SessionSummary>,
    /// Active session view, if one is selected.
    pub active: Option<ActiveView>,
    /// Raw text in the search box.
    pub search_typed: String,
    /// Query the session list is currently filtered by.
    pub search_applied: String,
}

impl ChatSnapshot {
    /// Serialize to pretty JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> ChatResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Session manager composed of store, replies, view window and search.
pub struct ChatManager {
    config: ChatConfig,
    store: SharedStore,
    replies: ReplyScheduler,
    window: ViewWindow,
    search: SearchFilter,
}

impl ChatManager {
    /// Create a manager over a fresh, empty store.
    ///
    /// Timers and the search debouncer run on the Tokio runtime current at
    /// construction.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or if no Tokio
    /// runtime is running ([`ChatError::NoRuntime`]).
    pub fn new(config: ChatConfig) -> ChatResult<Self> {
        Self::with_store(config, SharedStore::new(SessionStore::new()))
    }

    /// Create a manager over an existing store.
    ///
    /// # Errors
    /// Same as [`new`](Self::new).
    pub fn with_store(config: ChatConfig, store: SharedStore) -> ChatResult<Self> {
        config.validate()?;
        let replies = ReplyScheduler::new(store.clone(), config.reply.clone())?;
        let mut window = ViewWindow::new(config.view.page_size);
        let _ = window.sync_active(store.read().active_session_id());
        let search = SearchFilter::new(&config.search)?;
        info!(
            page_size = config.view.page_size,
            policy = ?config.send_policy,
            "Chat manager ready"
        );
        Ok(Self {
            config,
            store,
            replies,
            window,
            search,
        })
    }

    /// Shared store handle.
    ///
    /// Selection changes made through it are picked up by the view window on
    /// the next read.
    #[must_use]
    pub const fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Reply scheduler.
    #[must_use]
    pub const fn replies(&self) -> &ReplyScheduler {
        &self.replies
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Create a session from a raw name.
    ///
    /// # Errors
    /// Returns [`ChatError::EmptyName`] if the trimmed name is empty.
    pub fn create_session(&mut self, raw_name: &str) -> ChatResult<SessionId> {
        let name = non_empty_trimmed(raw_name).ok_or(ChatError::EmptyName)?;
        Ok(self.store.write().create_session(name))
    }

    /// Rename a session from a raw name.
    ///
    /// # Errors
    /// Returns [`ChatError::EmptyName`] for a blank name or
    /// [`ChatError::SessionNotFound`] if the session does not exist.
    pub fn rename_session(&mut self, id: SessionId, raw_name: &str) -> ChatResult<()> {
        let name = non_empty_trimmed(raw_name).ok_or(ChatError::EmptyName)?;
        if self.store.write().rename_session(id, name) {
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(id))
        }
    }

    /// Select the active session (or none) and reset the view window on a switch.
    ///
    /// # Errors
    /// Returns [`ChatError::SessionNotFound`] if `id` does not exist.
    pub fn select_session(&mut self, id: Option<SessionId>) -> ChatResult<()> {
        self.store.write().set_active_session(id)?;
        if self.sync_window() {
            info!(session_id = ?id, "Switched active session");
        }
        Ok(())
    }

    /// Delete a session. Returns `false` if it did not exist.
    ///
    /// Outstanding replies for it are left to find it gone when they fire.
    pub fn delete_session(&mut self, id: SessionId) -> bool {
        let deleted = self.store.write().delete_session(id);
        if deleted && self.replies.is_replying(id) {
            debug!(
                session_id = %id,
                pending = self.replies.pending_for(id),
                "Deleted session had replies in flight"
            );
        }
        let _ = self.sync_window();
        deleted
    }

    fn sync_window(&mut self) -> bool {
        let active = self.store.read().active_session_id();
        self.window.sync_active(active)
    }

    fn active_for_send(&self) -> ChatResult<SessionId> {
        let session_id = self
            .store
            .read()
            .active_session_id()
            .ok_or(ChatError::NoActiveSession)?;
        if self.config.send_policy == SendPolicy::SuppressWhilePending
            && self.replies.is_replying(session_id)
        {
            return Err(ChatError::ReplyPending(session_id));
        }
        Ok(session_id)
    }

    fn append_user(&self, session_id: SessionId, content: &str) -> ChatResult<()> {
        let outcome = self
            .store
            .write()
            .append_message(session_id, content, Author::User);
        match outcome {
            AppendOutcome::Appended(message_id) => {
                debug!(%session_id, %message_id, "User message sent");
                Ok(())
            }
            AppendOutcome::SessionNotFound => Err(ChatError::SessionNotFound(session_id)),
        }
    }

    /// Send a text message to the active session and schedule its reply.
    ///
    /// # Errors
    /// Returns [`ChatError::NoActiveSession`], [`ChatError::EmptyMessage`] or,
    /// under [`SendPolicy::SuppressWhilePending`], [`ChatError::ReplyPending`].
    pub fn send_message(&mut self, raw: &str) -> ChatResult<ReplyTicket> {
        let session_id = self.active_for_send()?;
        let content = non_empty_trimmed(raw).ok_or(ChatError::EmptyMessage)?;
        self.append_user(session_id, content)?;
        Ok(self.replies.schedule(session_id, content))
    }

    /// Send an image placeholder to the active session and schedule the
    /// fixed image reply.
    ///
    /// # Errors
    /// Same as [`send_message`](Self::send_message); a blank file name is
    /// reported as [`ChatError::EmptyMessage`].
    pub fn send_image(&mut self, file_name: &str) -> ChatResult<ReplyTicket> {
        let session_id = self.active_for_send()?;
        let file_name = non_empty_trimmed(file_name).ok_or(ChatError::EmptyMessage)?;
        self.append_user(session_id, &format!("[Image: {file_name}]"))?;
        Ok(self
            .replies
            .schedule_fixed(session_id, self.config.reply.image_reply.clone()))
    }

    /// Reveal one more page of older messages. Returns the new window size.
    pub fn load_older(&mut self) -> usize {
        let _ = self.sync_window();
        let visible = self.window.load_older();
        debug!(visible, "Loaded older messages");
        visible
    }

    /// Current window size for the active session.
    #[must_use]
    pub fn window_size(&self) -> usize {
        let active = self.store.read().active_session_id();
        self.window.visible_for(active)
    }

    fn window_of(&self, session: &Session) -> usize {
        self.window.visible_for(Some(session.id()))
    }

    /// Messages of the active session inside the view window.
    #[must_use]
    pub fn visible_messages(&self) -> Vec<Message> {
        self.store
            .read()
            .active_session()
            .map(|s| view::visible_messages(s.messages(), self.window_of(s)).to_vec())
            .unwrap_or_default()
    }

    /// Whether the active session has messages above the window.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.store
            .read()
            .active_session()
            .is_some_and(|s| view::has_more(s.messages(), self.window_of(s)))
    }

    /// Whether a reply is outstanding for the active session.
    #[must_use]
    pub fn is_replying(&self) -> bool {
        self.store
            .read()
            .active_session_id()
            .is_some_and(|id| self.replies.is_replying(id))
    }

    /// Record a search-box keystroke.
    pub fn set_search_query(&mut self, raw: impl Into<String>) {
        self.search.set_query(raw);
    }

    /// Wait until the next search query is applied.
    pub async fn search_applied(&mut self) -> bool {
        self.search.changed().await
    }

    /// Search query currently applied.
    #[must_use]
    pub fn applied_query(&self) -> AppliedQuery {
        self.search.applied()
    }

    /// Sessions matching the applied search query.
    #[must_use]
    pub fn filtered_sessions(&self) -> Vec<SessionSummary> {
        let store = self.store.read();
        self.search
            .filter(store.sessions())
            .into_iter()
            .map(SessionSummary::from_session)
            .collect()
    }

    /// Full view state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> ChatSnapshot {
        let active = {
            let store = self.store.read();
            store.active_session().map(|s| ActiveView {
                id: s.id(),
                name: s.name().to_string(),
                messages: view::visible_messages(s.messages(), self.window_of(s)).to_vec(),
                has_more: view::has_more(s.messages(), self.window_of(s)),
                is_replying: self.replies.is_replying(s.id()),
            })
        };
        ChatSnapshot {
            sessions: self.filtered_sessions(),
            active,
            search_typed: self.search.typed().to_string(),
            search_applied: self.search.applied().query,
        }
    }

    /// Wait for every outstanding reply to land.
    pub async fn drain_replies(&self) {
        self.replies.drain().await;
    }

    /// Abort outstanding replies.
    pub fn shutdown(&self) {
        self.replies.shutdown();
        info!("Chat manager shut down");
    }
}
