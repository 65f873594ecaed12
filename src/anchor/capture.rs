//! Selection capture
//!
//! Turns a raw user selection into a [`CapturedSelection`]: the anchor a
//! comment would persist, plus the live range. Capture is where the
//! rejection rules live; a rejected selection simply never becomes a
//! pending annotation.

use thiserror::Error;

use super::types::{Anchor, CapturedSelection};
use crate::doc::{Document, LineIndex, RangeError, Selection};

/// Why a selection did not become an anchor. Callers treat every variant
/// as "do not open the comment popup"; none of them are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("selection is empty or whitespace only")]
    EmptySelection,

    #[error("selection does not lie inside the document")]
    OutsideDocument,

    #[error("selection boundary is invalid: {0}")]
    InvalidBoundary(RangeError),

    #[error("selection lies inside an existing highlight")]
    InsideHighlight,
}

/// Capture a selection against the current render.
///
/// Line bounds are the min and max source lines over every block the
/// selection covers; both are `None` when no line-tracked block is
/// covered (the anchor still captures, resolution just degrades to a
/// whole-document search). A selection wholly inside an existing
/// highlight is rejected; one that merely crosses a highlight boundary
/// is allowed through.
pub fn capture(
    doc: &Document,
    index: &LineIndex,
    selection: &Selection,
) -> Result<CapturedSelection, CaptureError> {
    let range = doc.normalize_selection(selection).map_err(|err| match err {
        RangeError::UnknownNode | RangeError::DetachedNode => CaptureError::OutsideDocument,
        other => CaptureError::InvalidBoundary(other),
    })?;

    let text = doc.range_text(&range);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CaptureError::EmptySelection);
    }

    if let Some(ancestor) = doc.common_ancestor(range.start.node, range.end.node) {
        if doc.inside_highlight(ancestor) {
            tracing::debug!("selection rejected: inside an existing highlight");
            return Err(CaptureError::InsideHighlight);
        }
    }

    let blocks = index.blocks_intersecting(doc, &range);
    let line_start = blocks.iter().map(|b| b.lines.start).min();
    let line_end = blocks.iter().map(|b| b.lines.end).max();

    tracing::debug!(
        "captured {} bytes on lines {:?}..{:?}",
        trimmed.len(),
        line_start,
        line_end
    );

    Ok(CapturedSelection {
        anchor: Anchor {
            line_start,
            line_end,
            text: trimmed.to_string(),
        },
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Boundary, DocumentBuilder, NodeId};
    use crate::store::CommentId;

    fn review_document() -> Document {
        let mut builder = DocumentBuilder::new();
        builder.begin_block("p", 1, 2).text("alpha beta gamma").end();
        builder.begin_block("p", 4, 4).text("delta epsilon").end();
        builder.begin_element("aside").text("untracked note").end();
        builder.finish()
    }

    fn select(doc: &Document, node: NodeId, start: usize, end: usize) -> Selection {
        Selection::new(Boundary::new(node, start), Boundary::new(node, end))
    }

    #[test]
    fn test_capture_single_block_selection() {
        let doc = review_document();
        let index = LineIndex::build(&doc);
        let first = doc.text_nodes().next().unwrap();

        let captured = capture(&doc, &index, &select(&doc, first, 6, 10)).unwrap();
        assert_eq!(captured.anchor, Anchor::bounded(1, 2, "beta"));
        assert_eq!(captured.range.doc, doc.id());
    }

    #[test]
    fn test_capture_trims_surrounding_whitespace() {
        let doc = review_document();
        let index = LineIndex::build(&doc);
        let first = doc.text_nodes().next().unwrap();

        let captured = capture(&doc, &index, &select(&doc, first, 5, 11)).unwrap();
        assert_eq!(captured.text(), "beta");
    }

    #[test]
    fn test_capture_spanning_blocks_takes_min_and_max_lines() {
        let doc = review_document();
        let index = LineIndex::build(&doc);
        let first = doc.text_nodes().next().unwrap();
        let second = doc.text_nodes().nth(1).unwrap();

        let selection = Selection::new(Boundary::new(first, 11), Boundary::new(second, 5));
        let captured = capture(&doc, &index, &selection).unwrap();

        assert_eq!(captured.anchor.line_start, Some(1));
        assert_eq!(captured.anchor.line_end, Some(4));
        assert_eq!(captured.text(), "gamma\ndelta");
    }

    #[test]
    fn test_capture_outside_tracked_blocks_has_no_bounds() {
        let doc = review_document();
        let index = LineIndex::build(&doc);
        let aside_text = doc.text_nodes().nth(2).unwrap();

        let captured = capture(&doc, &index, &select(&doc, aside_text, 0, 9)).unwrap();
        assert_eq!(captured.anchor, Anchor::unbounded("untracked"));
    }

    #[test]
    fn test_whitespace_only_selection_is_rejected() {
        let doc = review_document();
        let index = LineIndex::build(&doc);
        let first = doc.text_nodes().next().unwrap();

        assert_eq!(
            capture(&doc, &index, &select(&doc, first, 5, 6)),
            Err(CaptureError::EmptySelection)
        );
    }

    #[test]
    fn test_collapsed_selection_is_rejected() {
        let doc = review_document();
        let index = LineIndex::build(&doc);
        let first = doc.text_nodes().next().unwrap();

        assert_eq!(
            capture(&doc, &index, &select(&doc, first, 4, 4)),
            Err(CaptureError::EmptySelection)
        );
    }

    #[test]
    fn test_selection_outside_document_is_rejected() {
        let doc = review_document();
        let index = LineIndex::build(&doc);

        assert_eq!(
            capture(&doc, &index, &select(&doc, NodeId(9999), 0, 4)),
            Err(CaptureError::OutsideDocument)
        );
    }

    #[test]
    fn test_selection_inside_highlight_is_rejected() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let first = doc.text_nodes().next().unwrap();

        let range = doc
            .normalize_selection(&select(&doc, first, 0, 10))
            .unwrap();
        let wrapper = doc.wrap_highlight(&range, CommentId(1)).unwrap();
        let covered = doc.children(wrapper)[0];

        assert_eq!(
            capture(&doc, &index, &select(&doc, covered, 0, 5)),
            Err(CaptureError::InsideHighlight)
        );
    }

    #[test]
    fn test_selection_crossing_highlight_boundary_is_allowed() {
        let mut doc = review_document();
        let index = LineIndex::build(&doc);
        let first = doc.text_nodes().next().unwrap();

        let range = doc.normalize_selection(&select(&doc, first, 0, 5)).unwrap();
        let wrapper = doc.wrap_highlight(&range, CommentId(2)).unwrap();
        let covered = doc.children(wrapper)[0];

        // From inside the highlight out into the split-off remainder.
        let paragraph = doc.children(doc.root())[0];
        let remainder = doc.children(paragraph)[1];
        let selection = Selection::new(Boundary::new(covered, 2), Boundary::new(remainder, 6));

        let captured = capture(&doc, &index, &selection).unwrap();
        assert_eq!(captured.text(), "pha beta");
    }
}
