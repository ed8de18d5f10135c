//! Multi-room chat session core.
//!
//! Organized leaf-first:
//! - `core`: configuration, errors, IDs and the message model
//! - `store`: append-only message logs and the session store
//! - `reply`: templated counterpart replies on delayed timers
//! - `view`: trailing "load older" window over a log
//! - `search`: debounced session-name filter
//! - `manager`: presentation-boundary facade tying the above together

pub mod core;
pub mod manager;
pub mod reply;
pub mod search;
pub mod store;
pub mod view;

pub use self::core::{
    Author, ChatConfig, ChatError, ChatResult, Message, MessageId, ReplyConfig, SearchConfig,
    SendPolicy, SessionId, ViewConfig,
};
pub use manager::{ActiveView, ChatManager, ChatSnapshot, SessionSummary};
pub use reply::{ReplyScheduler, ReplyTicket};
pub use search::{AppliedQuery, Debouncer, SearchFilter};
pub use store::{AppendOutcome, MessageLog, Session, SessionStore, SharedStore};
pub use view::ViewWindow;
