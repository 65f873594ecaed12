//! Comment persistence
//!
//! Wire types shared with the review server and the HTTP client that
//! talks to it. Everything above this module treats the store through
//! the [`CommentStore`] trait so sessions can be tested without a
//! network.

mod client;
mod types;

// Re-export store types
pub use client::{CommentStore, HttpCommentStore, StoreError};
pub use types::{Comment, CommentId, CommentUpdate, NewComment};
