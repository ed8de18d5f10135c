//! Delayed counterpart replies.
//!
//! Every scheduled reply is a one-shot Tokio task that sleeps for a random
//! delay and then appends a counterpart message to its session. Timers are
//! never cancelled when a session is deleted; instead the append at fire time
//! finds the session gone and does nothing.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use rand::Rng;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chat::core::config::ReplyConfig;
use crate::chat::core::errors::{ChatError, ChatResult};
use crate::chat::core::ids::SessionId;
use crate::chat::core::message::Author;
use crate::chat::reply::templates::{ReplyTemplates, TemplateRotation};
use crate::chat::store::{AppendOutcome, SharedStore};

/// Record of one armed reply.
#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use]
pub struct ReplyTicket {
    /// Session the reply will be appended to.
    pub session_id: SessionId,
    /// Template used, or `None` for a fixed reply.
    pub template_index: Option<usize>,
    /// Rendered reply body.
    pub body: String,
    /// Delay before the reply is appended.
    pub delay: Duration,
    /// When the reply was scheduled.
    pub scheduled_at: DateTime<Utc>,
}

/// Simulated asynchronous counterpart.
pub struct ReplyScheduler {
    store: SharedStore,
    config: ReplyConfig,
    templates: ReplyTemplates,
    rotation: TemplateRotation,
    runtime: Handle,
    pending: Arc<DashMap<SessionId, usize>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ReplyScheduler {
    /// Create a scheduler appending into `store`.
    ///
    /// Reply timers run on the Tokio runtime current at construction, so
    /// later calls may come from synchronous code.
    ///
    /// # Errors
    /// Returns [`ChatError::NoRuntime`] outside a Tokio runtime, or
    /// [`ChatError::InvalidConfig`] if the template list is empty.
    pub fn new(store: SharedStore, config: ReplyConfig) -> ChatResult<Self> {
        let runtime = Handle::try_current().map_err(|_| ChatError::NoRuntime)?;
        let templates = ReplyTemplates::new(config.templates.clone())?;
        let rotation = TemplateRotation::new(templates.len());
        Ok(Self {
            store,
            config,
            templates,
            rotation,
            runtime,
            pending: Arc::new(DashMap::new()),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Schedule a templated reply to `user_text` after a random delay.
    ///
    /// The delay is drawn uniformly from `[min_delay, min_delay + jitter]`.
    pub fn schedule(&self, session_id: SessionId, user_text: &str) -> ReplyTicket {
        let delay = self.draw_delay();
        self.schedule_with_delay(session_id, user_text, delay)
    }

    /// Schedule a templated reply with an explicit delay.
    ///
    /// The template is chosen now, so template order follows call order even
    /// when timers fire out of order.
    pub fn schedule_with_delay(
        &self,
        session_id: SessionId,
        user_text: &str,
        delay: Duration,
    ) -> ReplyTicket {
        let index = self.rotation.advance();
        let body = self.templates.render(index, user_text);
        self.arm(session_id, Some(index), body, delay)
    }

    /// Schedule a fixed reply that does not consume a template slot.
    pub fn schedule_fixed(&self, session_id: SessionId, body: impl Into<String>) -> ReplyTicket {
        let delay = self.draw_delay();
        self.arm(session_id, None, body.into(), delay)
    }

    fn draw_delay(&self) -> Duration {
        let min = self.config.min_delay_ms;
        let max = min.saturating_add(self.config.jitter_ms);
        let ms = rand::thread_rng().gen_range(min..=max);
        Duration::from_millis(ms)
    }

    fn arm(
        &self,
        session_id: SessionId,
        template_index: Option<usize>,
        body: String,
        delay: Duration,
    ) -> ReplyTicket {
        let ticket = ReplyTicket {
            session_id,
            template_index,
            body,
            delay,
            scheduled_at: Utc::now(),
        };

        *self.pending.entry(session_id).or_insert(0) += 1;

        let store = self.store.clone();
        let pending = Arc::clone(&self.pending);
        let body = ticket.body.clone();
        let handle = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = store
                .write()
                .append_message(session_id, body, Author::Counterpart);
            release(&pending, session_id);
            match outcome {
                AppendOutcome::Appended(message_id) => {
                    debug!(%session_id, %message_id, "Counterpart reply delivered");
                }
                AppendOutcome::SessionNotFound => {
                    debug!(%session_id, "Counterpart reply dropped, session was deleted");
                }
            }
        });

        {
            let mut handles = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
            handles.retain(|h| !h.is_finished());
            handles.push(handle);
        }

        debug!(
            %session_id,
            template = ?template_index,
            ?delay,
            "Reply scheduled"
        );
        ticket
    }

    /// Number of replies still outstanding for a session.
    #[must_use]
    pub fn pending_for(&self, session_id: SessionId) -> usize {
        self.pending.get(&session_id).map_or(0, |count| *count)
    }

    /// Whether a reply is outstanding for a session.
    #[must_use]
    pub fn is_replying(&self, session_id: SessionId) -> bool {
        self.pending_for(session_id) > 0
    }

    /// Number of replies outstanding across all sessions.
    #[must_use]
    pub fn pending_total(&self) -> usize {
        self.pending.iter().map(|entry| *entry.value()).sum()
    }

    /// Template index the next templated reply will use.
    #[must_use]
    pub fn next_template_index(&self) -> usize {
        self.rotation.peek()
    }

    /// Wait until every reply armed so far has fired.
    pub async fn drain(&self) {
        let handles = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if handles.is_empty() {
            return;
        }
        info!(count = handles.len(), "Waiting for outstanding replies");
        for result in join_all(handles).await {
            if let Err(err) = result {
                warn!(?err, "Reply task did not complete");
            }
        }
    }

    /// Abort every outstanding reply.
    pub fn shutdown(&self) {
        let handles = std::mem::take(
            &mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let live = handles.iter().filter(|h| !h.is_finished()).count();
        for handle in handles {
            handle.abort();
        }
        self.pending.clear();
        if live > 0 {
            warn!(aborted = live, "Reply scheduler shut down with replies outstanding");
        }
    }
}

fn release(pending: &DashMap<SessionId, usize>, session_id: SessionId) {
    let drained = pending.get_mut(&session_id).is_some_and(|mut count| {
        *count = count.saturating_sub(1);
        *count == 0
    });
    if drained {
        pending.remove_if(&session_id, |_, count| *count == 0);
    }
}
