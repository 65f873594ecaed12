//! Annotation store wire types
//!
//! These mirror the JSON the review server speaks. Field names are the
//! wire names; the store assigns ids and timestamps.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::anchor::Anchor;

/// Store-assigned comment identifier.
///
/// Opaque to this crate beyond equality and hashing; the store happens to
/// hand out integers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CommentId(pub i64);

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted review comment.
///
/// `line_start`/`line_end` are the anchor's line bounds and are null when
/// the selection touched no line-tracked block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub project_directory: String,
    pub file_path: String,
    pub line_start: Option<u32>,
    pub line_end: Option<u32>,
    pub selected_text: String,
    pub comment_text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// The anchor this comment re-resolves by.
    pub fn anchor(&self) -> Anchor {
        Anchor {
            line_start: self.line_start,
            line_end: self.line_end,
            text: self.selected_text.clone(),
        }
    }
}

/// Payload for creating a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub project_directory: String,
    pub file_path: String,
    pub line_start: Option<u32>,
    pub line_end: Option<u32>,
    pub selected_text: String,
    pub comment_text: String,
}

/// Payload for editing a comment's text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentUpdate {
    pub comment_text: String,
}
