//! Configuration for the chat core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chat::core::errors::{ChatError, ChatResult};

/// Placeholder replaced by the user's text inside a reply template.
pub const MESSAGE_PLACEHOLDER: &str = "{message}";

/// Top-level configuration for a chat manager.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Simulated counterpart settings.
    pub reply: ReplyConfig,
    /// Message pagination settings.
    pub view: ViewConfig,
    /// Session search settings.
    pub search: SearchConfig,
    /// What to do when the user sends while a reply is outstanding.
    pub send_policy: SendPolicy,
}

impl ChatConfig {
    /// Parse a configuration from JSON and validate it.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or any value is invalid.
    pub fn from_json_str(raw: &str) -> ChatResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CHATROOM_*` environment overrides on top of this configuration.
    ///
    /// Unparseable values are ignored and the current value is kept.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ms) = env_u64("CHATROOM_REPLY_MIN_DELAY_MS") {
            self.reply.min_delay_ms = ms;
        }
        if let Some(ms) = env_u64("CHATROOM_REPLY_JITTER_MS") {
            self.reply.jitter_ms = ms;
        }
        if let Some(size) = env_u64("CHATROOM_PAGE_SIZE").and_then(|v| usize::try_from(v).ok()) {
            self.view.page_size = size;
        }
        if let Some(ms) = env_u64("CHATROOM_SEARCH_DEBOUNCE_MS") {
            self.search.debounce_ms = ms;
        }
        self
    }

    /// Replace the reply settings.
    #[must_use]
    pub fn with_reply(mut self, reply: ReplyConfig) -> Self {
        self.reply = reply;
        self
    }

    /// Set the page size used by the view window.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.view.page_size = page_size;
        self
    }

    /// Set the search debounce quiet period.
    #[must_use]
    pub fn with_debounce(mut self, quiet: Duration) -> Self {
        self.search.debounce_ms = duration_ms(quiet);
        self
    }

    /// Set the send policy.
    #[must_use]
    pub const fn with_send_policy(mut self, policy: SendPolicy) -> Self {
        self.send_policy = policy;
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> ChatResult<()> {
        if self.view.page_size == 0 {
            return Err(ChatError::InvalidConfig(
                "view.page_size must be > 0".to_string(),
            ));
        }

        if self.search.debounce_ms == 0 {
            return Err(ChatError::InvalidConfig(
                "search.debounce_ms must be > 0".to_string(),
            ));
        }

        if self.reply.templates.is_empty() {
            return Err(ChatError::InvalidConfig(
                "reply.templates must not be empty".to_string(),
            ));
        }

        if let Some(index) = self
            .reply
            .templates
            .iter()
            .position(|template| template.trim().is_empty())
        {
            return Err(ChatError::InvalidConfig(format!(
                "reply.templates[{index}] must not be blank"
            )));
        }

        if self.reply.image_reply.trim().is_empty() {
            return Err(ChatError::InvalidConfig(
                "reply.image_reply must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

/// Simulated counterpart settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    /// Lower bound of the reply delay, in milliseconds.
    pub min_delay_ms: u64,
    /// Width of the uniform jitter added on top of `min_delay_ms`.
    pub jitter_ms: u64,
    /// Rotating reply templates; `{message}` is replaced by the user text.
    pub templates: Vec<String>,
    /// Fixed reply sent after an image upload.
    pub image_reply: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1500,
            jitter_ms: 1000,
            templates: default_templates(),
            image_reply: "Image received. How can I help with this?".to_string(),
        }
    }
}

impl ReplyConfig {
    /// Lower bound of the reply delay.
    #[must_use]
    pub const fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    /// Upper bound of the reply delay (inclusive).
    #[must_use]
    pub const fn max_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms.saturating_add(self.jitter_ms))
    }

    /// Set both delay bounds.
    #[must_use]
    pub fn with_delay(mut self, min_delay: Duration, jitter: Duration) -> Self {
        self.min_delay_ms = duration_ms(min_delay);
        self.jitter_ms = duration_ms(jitter);
        self
    }

    /// Replace the template list.
    #[must_use]
    pub fn with_templates<I, S>(mut self, templates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.templates = templates.into_iter().map(Into::into).collect();
        self
    }
}

fn default_templates() -> Vec<String> {
    [
        "Understood: \"{message}\". I am here to help you.",
        "Interesting point about \"{message}\". Tell me more.",
        "Got it: \"{message}\". Let me think about that.",
        "Thanks for sharing \"{message}\". How else can I help?",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Message pagination settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Number of messages revealed per page.
    pub page_size: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

/// Session search settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period before a typed query is applied, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl SearchConfig {
    /// Quiet period as a `Duration`.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Behavior when the user sends while a counterpart reply is outstanding.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendPolicy {
    /// Refuse the send until the pending reply has landed.
    #[default]
    SuppressWhilePending,
    /// Accept the send; replies may overlap and land in any order.
    AllowOverlap,
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
