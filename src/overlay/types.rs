//! Overlay types

use serde::Serialize;
use thiserror::Error;

use crate::doc::{LineSpan, NodeId, WrapError};
use crate::store::CommentId;

/// A materialized highlight: one comment currently visible in the
/// document. At most one exists per comment id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub comment_id: CommentId,
    /// The `mark` wrapper element in the document tree.
    pub wrapper: NodeId,
    /// Line bounds recorded at capture time, if any.
    pub lines: Option<LineSpan>,
    pub selected_text: String,
    pub comment_text: String,
}

impl Highlight {
    /// Label shown next to the annotation: `L3`, `L3-5`, or nothing when
    /// the anchor had no line bounds.
    pub fn line_label(&self) -> Option<String> {
        self.lines.map(|span| span.to_string())
    }
}

/// What happened when a comment was pushed into the document.
///
/// None of these are errors to the caller. Failed outcomes leave no
/// visual trace; the comment simply stays unresolved until the next
/// rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeOutcome {
    /// A new highlight was wrapped into the tree.
    Highlighted,
    /// The comment already has a live highlight; nothing changed.
    AlreadyHighlighted,
    /// The anchor text was not found in the current render.
    NotFound,
    /// The anchor resolved but the range could not be wrapped.
    WrapFailed(WrapError),
}

impl MaterializeOutcome {
    /// True when a highlight exists after the call, new or pre-existing.
    pub fn is_highlighted(&self) -> bool {
        matches!(
            self,
            MaterializeOutcome::Highlighted | MaterializeOutcome::AlreadyHighlighted
        )
    }
}

/// One row of the aggregate annotation view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationEntry {
    pub comment_id: CommentId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_label: Option<String>,
    pub selected_text: String,
    pub comment_text: String,
}

/// Overlay operations that presuppose a live highlight report these when
/// the presupposition fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("no highlight is materialized for comment {0}")]
    HighlightMissing(CommentId),

    #[error("highlight wrapper for comment {0} is invalid: {1}")]
    BrokenWrapper(CommentId, WrapError),
}
