//! Anchor types
//!
//! An anchor is everything re-resolution gets to work with: the window of
//! source lines the selection touched, plus the exact selected text.

use serde::{Deserialize, Serialize};

use crate::doc::DocRange;

/// Where a comment was taken from.
///
/// Both line bounds are absent when the selection touched no line-tracked
/// block; resolution then falls back to searching the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// First source line of any block the selection touched (1-based).
    pub line_start: Option<u32>,
    /// Last source line of any block the selection touched (1-based).
    pub line_end: Option<u32>,
    /// The selected text, trimmed of surrounding whitespace, verbatim
    /// otherwise.
    pub text: String,
}

impl Anchor {
    /// Anchor with line bounds.
    pub fn bounded(line_start: u32, line_end: u32, text: impl Into<String>) -> Self {
        Self {
            line_start: Some(line_start),
            line_end: Some(line_end),
            text: text.into(),
        }
    }

    /// Anchor without line information.
    pub fn unbounded(text: impl Into<String>) -> Self {
        Self {
            line_start: None,
            line_end: None,
            text: text.into(),
        }
    }

    /// True when resolution has no line bounds to narrow by.
    pub fn is_unbounded(&self) -> bool {
        self.line_start.is_none() || self.line_end.is_none()
    }
}

/// One captured selection: the transient state between "user selected
/// text" and "user saved or abandoned the comment".
///
/// The range is the live selection in the current render; the anchor is
/// what a comment created from it would persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSelection {
    pub anchor: Anchor,
    pub range: DocRange,
}

impl CapturedSelection {
    /// The selected text, as the anchor records it.
    pub fn text(&self) -> &str {
        &self.anchor.text
    }
}
