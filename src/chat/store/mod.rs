//! Session and message storage.

pub mod log;
pub mod session_store;
pub mod shared;

pub use log::MessageLog;
pub use session_store::{AppendOutcome, Session, SessionStore};
pub use shared::SharedStore;
