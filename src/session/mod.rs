//! Review sessions
//!
//! A [`DocumentSession`] ties the pieces together for one file under
//! review: the rendered document, its line index, the highlight
//! overlay, and the comments held by the store. Sessions are driven by
//! user actions and server events, one at a time.

mod state;
mod types;

// Re-export session types
pub use state::DocumentSession;
pub use types::{CreateIntent, DeleteIntent, LiveEvent, LoadReport, Reaction, UpdateIntent};
