//! Paginated message views.

pub mod window;

pub use window::{ViewWindow, has_more, visible_messages};
