//! Trailing window over a session log for incremental display.

use crate::chat::core::ids::SessionId;
use crate::chat::core::message::Message;
use crate::chat::store::MessageLog;

/// Last `min(window, len)` messages of `log`, in original order.
#[must_use]
pub fn visible_messages(log: &MessageLog, window: usize) -> &[Message] {
    let all = log.as_slice();
    &all[all.len().saturating_sub(window)..]
}

/// Whether older messages exist beyond the window.
#[must_use]
pub fn has_more(log: &MessageLog, window: usize) -> bool {
    log.len() > window
}

/// Per-session visible count.
///
/// Tracks which session it was last synced to; switching sessions resets the
/// count to one page, while appends to the same session leave it alone.
#[derive(Clone, Debug)]
pub struct ViewWindow {
    page_size: usize,
    visible: usize,
    session: Option<SessionId>,
}

impl ViewWindow {
    /// Create a window showing one page.
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            page_size,
            visible: page_size,
            session: None,
        }
    }

    /// Follow the active session. Returns `true` if the window was reset.
    pub fn sync_active(&mut self, active: Option<SessionId>) -> bool {
        if self.session == active {
            return false;
        }
        self.session = active;
        self.visible = self.page_size;
        true
    }

    /// Reveal one more page of older messages.
    ///
    /// Uncapped: a window larger than the log just shows the whole log.
    pub const fn load_older(&mut self) -> usize {
        self.visible = self.visible.saturating_add(self.page_size);
        self.visible
    }

    /// Current visible count.
    #[must_use]
    pub const fn visible(&self) -> usize {
        self.visible
    }

    /// Visible count to use for `active`.
    ///
    /// One page unless the window already follows `active`, so a selection
    /// changed behind the window's back never inherits another session's
    /// expanded count.
    #[must_use]
    pub fn visible_for(&self, active: Option<SessionId>) -> usize {
        if self.session == active {
            self.visible
        } else {
            self.page_size
        }
    }

    /// Page size.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Session the window currently tracks.
    #[must_use]
    pub const fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// Messages of `log` inside this window.
    #[must_use]
    pub fn slice<'a>(&self, log: &'a MessageLog) -> &'a [Message] {
        visible_messages(log, self.visible)
    }

    /// Whether `log` has messages above this window.
    #[must_use]
    pub fn has_more(&self, log: &MessageLog) -> bool {
        has_more(log, self.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::core::message::Author;

    fn log_of(n: usize) -> MessageLog {
        let mut log = MessageLog::new();
        for i in 0..n {
            log.append(format!("m{i}"), Author::User);
        }
        log
    }

    #[test]
    fn test_visible_is_suffix() {
        let log = log_of(10);
        for w in 0..15 {
            let view = visible_messages(&log, w);
            assert_eq!(view.len(), w.min(10));
            assert_eq!(view, &log.as_slice()[10 - view.len()..]);
        }
        assert_eq!(visible_messages(&log, log.len()), log.as_slice());
    }

    #[test]
    fn test_empty_log() {
        let log = MessageLog::new();
        assert!(visible_messages(&log, 20).is_empty());
        assert!(!has_more(&log, 0));
    }

    #[test]
    fn test_twenty_five_messages_page_twenty() {
        let log = log_of(25);
        let mut window = ViewWindow::new(20);
        let _ = window.sync_active(Some(SessionId::new()));

        let view = window.slice(&log);
        assert_eq!(view.len(), 20);
        assert_eq!(view.first().map(Message::content), Some("m5"));
        assert!(window.has_more(&log));

        assert_eq!(window.load_older(), 40);
        assert_eq!(window.slice(&log).len(), 25);
        assert!(!window.has_more(&log));
    }

    #[test]
    fn test_switch_resets_once() {
        let a = SessionId::new();
        let b = SessionId::new();
        let mut window = ViewWindow::new(20);

        assert!(window.sync_active(Some(a)));
        let _ = window.load_older();
        assert!(!window.sync_active(Some(a)));
        assert_eq!(window.visible(), 40);

        assert!(window.sync_active(Some(b)));
        assert_eq!(window.visible(), 20);
        assert_eq!(window.session(), Some(b));

        assert!(window.sync_active(None));
        assert_eq!(window.visible(), window.page_size());
    }

    #[test]
    fn test_visible_for_untracked_session_is_one_page() {
        let a = SessionId::new();
        let b = SessionId::new();
        let mut window = ViewWindow::new(20);
        let _ = window.sync_active(Some(a));
        let _ = window.load_older();
        let _ = window.load_older();

        assert_eq!(window.visible_for(Some(a)), 60);
        assert_eq!(window.visible_for(Some(b)), 20);
        assert_eq!(window.visible_for(None), 20);
    }
}
