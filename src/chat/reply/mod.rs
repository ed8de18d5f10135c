//! Simulated counterpart replies.

pub mod scheduler;
pub mod templates;

pub use scheduler::{ReplyScheduler, ReplyTicket};
pub use templates::{ReplyTemplates, TemplateRotation};
