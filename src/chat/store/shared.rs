//! Cloneable handle to a store shared between the facade and timer tasks.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::chat::store::session_store::SessionStore;

/// Shared, lock-protected [`SessionStore`].
///
/// Each call to [`read`](Self::read) or [`write`](Self::write) is one atomic
/// step; guards must not be held across an `.await`. A poisoned lock is
/// recovered rather than propagated, since every store operation leaves the
/// store consistent before it can panic.
#[derive(Clone, Debug, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<SessionStore>>,
}

impl SharedStore {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }

    /// Acquire read access.
    pub fn read(&self) -> RwLockReadGuard<'_, SessionStore> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, SessionStore> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionStore {
        self.read().clone()
    }
}
