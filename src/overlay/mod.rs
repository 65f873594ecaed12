//! Highlight overlay
//!
//! Where comments become visible. The overlay materializes each comment
//! into a highlight wrapper in the document tree, tracks the result per
//! comment id, and derives the aggregate annotation view from the tree on
//! demand. State per comment moves one way: unresolved, highlighted,
//! removed; a comment whose anchor fails to resolve stays unresolved
//! until the next full rebuild.

mod manager;
mod types;

// Re-export the manager
pub use manager::OverlayManager;

// Re-export the overlay model
pub use types::{AnnotationEntry, Highlight, MaterializeOutcome, OverlayError};
