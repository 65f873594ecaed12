//! Highlight lifecycle
//!
//! The overlay owns every live highlight of one render and drives each
//! comment through its states: unresolved until materialization finds its
//! text, highlighted while a wrapper sits in the tree, removed once the
//! wrapper is unwrapped. The aggregate annotation view is recomputed from
//! the document on every call, never stored.

use std::collections::HashMap;

use super::types::{AnnotationEntry, Highlight, MaterializeOutcome, OverlayError};
use crate::anchor::resolve;
use crate::doc::{Document, LineIndex, LineSpan};
use crate::store::{Comment, CommentId};

/// Owns the live highlights of one document render.
///
/// The caller owns the [`Document`] and passes it in mutably; the overlay
/// never holds a reference to it, so snapshots can never observe a
/// half-applied mutation.
#[derive(Debug, Default)]
pub struct OverlayManager {
    highlights: HashMap<CommentId, Highlight>,
}

impl OverlayManager {
    pub fn new() -> Self {
        Self {
            highlights: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    pub fn contains(&self, id: CommentId) -> bool {
        self.highlights.contains_key(&id)
    }

    pub fn get(&self, id: CommentId) -> Option<&Highlight> {
        self.highlights.get(&id)
    }

    /// Resolve a comment's anchor and wrap it into the document.
    ///
    /// Idempotent per comment id: a comment that already has a live
    /// highlight reports [`MaterializeOutcome::AlreadyHighlighted`] and
    /// nothing changes. Resolution and wrap failures are logged and leave
    /// no trace; there is no automatic retry.
    pub fn materialize(
        &mut self,
        doc: &mut Document,
        index: &LineIndex,
        comment: &Comment,
    ) -> MaterializeOutcome {
        if self.highlights.contains_key(&comment.id) {
            return MaterializeOutcome::AlreadyHighlighted;
        }

        let anchor = comment.anchor();
        let Some(range) = resolve(doc, index, &anchor) else {
            tracing::warn!(
                "could not locate text for comment {} on lines {:?}..{:?}",
                comment.id,
                anchor.line_start,
                anchor.line_end
            );
            return MaterializeOutcome::NotFound;
        };

        match doc.wrap_highlight(&range, comment.id) {
            Ok(wrapper) => {
                self.highlights.insert(
                    comment.id,
                    Highlight {
                        comment_id: comment.id,
                        wrapper,
                        lines: LineSpan::from_bounds(comment.line_start, comment.line_end),
                        selected_text: comment.selected_text.clone(),
                        comment_text: comment.comment_text.clone(),
                    },
                );
                MaterializeOutcome::Highlighted
            }
            Err(err) => {
                tracing::warn!("could not wrap highlight for comment {}: {}", comment.id, err);
                MaterializeOutcome::WrapFailed(err)
            }
        }
    }

    /// Change the annotation text shown for a live highlight.
    pub fn update(&mut self, id: CommentId, comment_text: &str) -> Result<(), OverlayError> {
        match self.highlights.get_mut(&id) {
            Some(highlight) => {
                highlight.comment_text = comment_text.to_string();
                Ok(())
            }
            None => Err(OverlayError::HighlightMissing(id)),
        }
    }

    /// Unwrap a highlight, restoring the document to its pre-highlight
    /// shape, and forget it.
    pub fn remove(&mut self, doc: &mut Document, id: CommentId) -> Result<(), OverlayError> {
        let wrapper = match self.highlights.get(&id) {
            Some(highlight) => highlight.wrapper,
            None => return Err(OverlayError::HighlightMissing(id)),
        };
        doc.unwrap_highlight(wrapper)
            .map_err(|err| OverlayError::BrokenWrapper(id, err))?;
        self.highlights.remove(&id);
        Ok(())
    }

    /// The aggregate annotation view, rebuilt fresh: wrappers are walked
    /// in document order and joined with the highlight map, so the result
    /// always reflects where highlights actually sit on screen.
    pub fn snapshot(&self, doc: &Document) -> Vec<AnnotationEntry> {
        doc.highlights()
            .into_iter()
            .filter_map(|(_, id)| self.highlights.get(&id))
            .map(|highlight| AnnotationEntry {
                comment_id: highlight.comment_id,
                line_label: highlight.line_label(),
                selected_text: highlight.selected_text.clone(),
                comment_text: highlight.comment_text.clone(),
            })
            .collect()
    }

    /// Forget every highlight without touching the document. For use when
    /// the render itself is being discarded.
    pub fn clear(&mut self) {
        self.highlights.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::doc::DocumentBuilder;

    fn review_document() -> Document {
        let mut builder = DocumentBuilder::new();
        builder.begin_block("p", 1, 1).text("alpha beta gamma").end();
        builder.begin_block("p", 3, 3).text("delta epsilon").end();
        builder.begin_block("p", 5, 5).text("zeta eta theta").end();
        builder.finish()
    }

    fn comment(id: i64, lines: (u32, u32), selected: &str, text: &str) -> Comment {
        Comment {
            id: CommentId(id),
            project_directory: "/work/demo".to_string(),
            file_path: "notes/plan.md".to_string(),
            line_start: Some(lines.0),
            line_end: Some(lines.1),
            selected_text: selected.to_string(),
            comment_text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_materialize_wraps_and_registers() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let mut overlay = OverlayManager::new();

        let outcome = overlay.materialize(&mut doc, &index, &comment(1, (1, 1), "beta", "hm"));
        assert_eq!(outcome, MaterializeOutcome::Highlighted);
        assert!(overlay.contains(CommentId(1)));
        assert_eq!(doc.highlights().len(), 1);
        assert_eq!(doc.text_content(), "alpha beta gamma\ndelta epsilon\nzeta eta theta");
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let mut overlay = OverlayManager::new();
        let c = comment(1, (1, 1), "beta", "hm");

        assert_eq!(
            overlay.materialize(&mut doc, &index, &c),
            MaterializeOutcome::Highlighted
        );
        assert_eq!(
            overlay.materialize(&mut doc, &index, &c),
            MaterializeOutcome::AlreadyHighlighted
        );
        assert_eq!(overlay.len(), 1);
        assert_eq!(doc.highlights().len(), 1);
    }

    #[test]
    fn test_materialize_missing_text_reports_not_found() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let mut overlay = OverlayManager::new();

        let outcome =
            overlay.materialize(&mut doc, &index, &comment(2, (1, 1), "no such text", "hm"));
        assert_eq!(outcome, MaterializeOutcome::NotFound);
        assert!(overlay.is_empty());
        assert!(doc.highlights().is_empty());
    }

    #[test]
    fn test_remove_restores_document_exactly() {
        let mut doc = review_document();
        let before = doc.text_content();
        let index = LineIndex::build(&doc);
        let mut overlay = OverlayManager::new();

        overlay.materialize(&mut doc, &index, &comment(3, (3, 3), "delta", "hm"));
        overlay.remove(&mut doc, CommentId(3)).unwrap();

        assert_eq!(doc.text_content(), before);
        assert!(doc.highlights().is_empty());
        assert!(!overlay.contains(CommentId(3)));
    }

    #[test]
    fn test_update_changes_snapshot_text() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let mut overlay = OverlayManager::new();

        overlay.materialize(&mut doc, &index, &comment(4, (1, 1), "beta", "first draft"));
        overlay.update(CommentId(4), "second draft").unwrap();

        let entries = overlay.snapshot(&doc);
        assert_eq!(entries[0].comment_text, "second draft");
        assert_eq!(entries[0].selected_text, "beta");
    }

    #[test]
    fn test_update_without_highlight_fails() {
        let mut overlay = OverlayManager::new();
        assert_eq!(
            overlay.update(CommentId(9), "text"),
            Err(OverlayError::HighlightMissing(CommentId(9)))
        );
    }

    #[test]
    fn test_remove_without_highlight_fails() {
        let mut doc = review_document();
        let mut overlay = OverlayManager::new();
        assert_eq!(
            overlay.remove(&mut doc, CommentId(9)),
            Err(OverlayError::HighlightMissing(CommentId(9)))
        );
    }

    #[test]
    fn test_snapshot_orders_by_document_position() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let mut overlay = OverlayManager::new();

        // Neither id order nor materialize order follows document
        // position: the middle block carries the highest id.
        overlay.materialize(&mut doc, &index, &comment(3, (3, 3), "delta", "middle"));
        overlay.materialize(&mut doc, &index, &comment(1, (1, 1), "alpha", "top"));
        overlay.materialize(&mut doc, &index, &comment(2, (5, 5), "zeta", "bottom"));

        let order: Vec<CommentId> = overlay
            .snapshot(&doc)
            .into_iter()
            .map(|entry| entry.comment_id)
            .collect();
        assert_eq!(order, vec![CommentId(1), CommentId(3), CommentId(2)]);
    }

    #[test]
    fn test_snapshot_carries_line_labels() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let mut overlay = OverlayManager::new();

        overlay.materialize(&mut doc, &index, &comment(1, (1, 1), "beta", "hm"));
        let entries = overlay.snapshot(&doc);
        assert_eq!(entries[0].line_label.as_deref(), Some("L1"));
    }

    #[test]
    fn test_clear_forgets_without_unwrapping() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let mut overlay = OverlayManager::new();

        overlay.materialize(&mut doc, &index, &comment(1, (1, 1), "beta", "hm"));
        overlay.clear();

        assert!(overlay.is_empty());
        // The wrapper is still in the (about to be discarded) tree.
        assert_eq!(doc.highlights().len(), 1);
        assert!(overlay.snapshot(&doc).is_empty());
    }
}
