//! Reply templates and the rotation counter that walks them.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::chat::core::config::MESSAGE_PLACEHOLDER;
use crate::chat::core::errors::{ChatError, ChatResult};

/// Fixed, ordered list of reply templates.
#[derive(Clone, Debug)]
pub struct ReplyTemplates {
    templates: Vec<String>,
}

impl ReplyTemplates {
    /// Build a template list.
    ///
    /// # Errors
    /// Returns an error if `templates` is empty.
    pub fn new(templates: Vec<String>) -> ChatResult<Self> {
        if templates.is_empty() {
            return Err(ChatError::InvalidConfig(
                "reply.templates must not be empty".to_string(),
            ));
        }
        Ok(Self { templates })
    }

    /// Number of templates (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Render template `index` (taken modulo the list length) for `text`.
    ///
    /// Every `{message}` placeholder is replaced by the trimmed text.
    #[must_use]
    pub fn render(&self, index: usize, text: &str) -> String {
        let template = &self.templates[index % self.templates.len()];
        template.replace(MESSAGE_PLACEHOLDER, text.trim())
    }
}

/// Round-robin index over a fixed number of templates.
///
/// Owned by one scheduler; separate schedulers rotate independently.
#[derive(Debug)]
pub struct TemplateRotation {
    next: AtomicUsize,
    count: usize,
}

impl TemplateRotation {
    /// Start a rotation at index 0.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            count: count.max(1),
        }
    }

    /// Take the current index and advance to `(index + 1) mod count`.
    #[must_use]
    pub fn advance(&self) -> usize {
        let count = self.count;
        match self
            .next
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |i| Some((i + 1) % count))
        {
            Ok(prev) | Err(prev) => prev,
        }
    }

    /// Index the next call to [`advance`](Self::advance) will return.
    #[must_use]
    pub fn peek(&self) -> usize {
        self.next.load(Ordering::Acquire)
    }
}
