//! Debounced, case-insensitive filter over session names.

use tokio::sync::watch;
use tracing::debug;

use crate::chat::core::config::SearchConfig;
use crate::chat::core::errors::ChatResult;
use crate::chat::search::debounce::Debouncer;
use crate::chat::store::Session;

/// Case-insensitive substring match of `query` in `name`.
///
/// Surrounding whitespace in the query is ignored; an empty query matches
/// every name.
#[must_use]
pub fn matches(name: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
}

/// Sessions whose name matches `query`, in their original order.
#[must_use]
pub fn filter_sessions<'a>(sessions: &'a [Session], query: &str) -> Vec<&'a Session> {
    sessions.iter().filter(|s| matches(s.name(), query)).collect()
}

/// Query value the filter is currently applying.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AppliedQuery {
    /// Query text.
    pub query: String,
    /// Number of applications so far; 0 until the first quiet period elapses.
    pub generation: u64,
}

/// Search box state: the raw typed query plus the debounced applied query.
pub struct SearchFilter {
    typed: String,
    debouncer: Debouncer<String>,
    applied: watch::Receiver<AppliedQuery>,
}

impl SearchFilter {
    /// Create a filter whose debounce task runs on the current runtime.
    ///
    /// # Errors
    /// Returns [`ChatError::NoRuntime`](crate::chat::ChatError::NoRuntime)
    /// outside a Tokio runtime.
    pub fn new(config: &SearchConfig) -> ChatResult<Self> {
        let (tx, applied) = watch::channel(AppliedQuery::default());
        let debouncer = Debouncer::spawn(config.debounce(), move |query: String| {
            tx.send_modify(|current| {
                current.generation += 1;
                debug!(query = %query, generation = current.generation, "Search query applied");
                current.query = query;
            });
        })?;
        Ok(Self {
            typed: String::new(),
            debouncer,
            applied,
        })
    }

    /// Record a keystroke. The value is applied after the quiet period.
    pub fn set_query(&mut self, raw: impl Into<String>) {
        self.typed = raw.into();
        if !self.debouncer.push(self.typed.clone()) {
            debug!("Search debouncer is gone, keystroke ignored");
        }
    }

    /// Latest typed (not necessarily applied) query.
    #[must_use]
    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Snapshot of the applied query.
    #[must_use]
    pub fn applied(&self) -> AppliedQuery {
        self.applied.borrow().clone()
    }

    /// Wait for the next application. Returns `false` if none can happen.
    pub async fn changed(&mut self) -> bool {
        self.applied.changed().await.is_ok()
    }

    /// Apply the current snapshot to `sessions`.
    #[must_use]
    pub fn filter<'a>(&self, sessions: &'a [Session]) -> Vec<&'a Session> {
        filter_sessions(sessions, &self.applied.borrow().query)
    }
}
