//! Anchor capture and resolution
//!
//! Comments do not store tree positions; they store an [`Anchor`]: the
//! source line window the selection touched plus the exact selected text.
//! Capture derives an anchor from a live selection; resolution finds the
//! anchor's text again in a fresh render. The two sides are deliberately
//! asymmetric: capture sees a range, resolution only ever sees lines and
//! text, so a comment survives any re-render its text survives.

mod capture;
mod resolve;
mod types;

// Re-export the anchor model
pub use types::{Anchor, CapturedSelection};

// Re-export capture
pub use capture::{capture, CaptureError};

// Re-export resolution
pub use resolve::resolve;
