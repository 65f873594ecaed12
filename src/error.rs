//! Crate-level error type
//!
//! Session operations fold subsystem failures into one enum. Failures
//! that leave a comment unresolved but keep the session healthy (anchor
//! text not found, wrap refused) are not errors here; they surface as
//! [`MaterializeOutcome`](crate::overlay::MaterializeOutcome) variants
//! instead. Nothing in this crate aborts the session.

use thiserror::Error;

use crate::anchor::CaptureError;
use crate::overlay::OverlayError;
use crate::store::{CommentId, StoreError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The selection cannot anchor a comment. Callers discard the
    /// selection and carry on; the render is untouched.
    #[error("capture rejected: {0}")]
    Capture(#[from] CaptureError),

    /// The overlay lost track of a highlight it should own.
    #[error(transparent)]
    Overlay(#[from] OverlayError),

    /// The store refused or never received a request. Local state is
    /// unchanged; callers surface this to the user.
    #[error("store request failed: {0}")]
    Store(#[from] StoreError),

    /// A completion arrived for a comment the session no longer tracks.
    /// The completion is dropped without touching anything.
    #[error("comment {id} is not tracked by this session")]
    Precondition { id: CommentId },

    /// No captured selection to attach the comment to.
    #[error("no selection is captured")]
    NoSelection,

    /// Comment text was empty after trimming.
    #[error("comment text is empty")]
    EmptyComment,
}
