//! Session search.

pub mod debounce;
pub mod filter;

pub use debounce::Debouncer;
pub use filter::{AppliedQuery, SearchFilter, filter_sessions, matches};
