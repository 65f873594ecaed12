//! Boundaries and ranges over the document tree
//!
//! Positions are byte offsets inside text nodes, never inside elements.
//! A raw [`Selection`] arrives with its endpoints in whatever order the
//! user dragged; normalizing it yields a [`DocRange`] whose start precedes
//! its end in document order and which is stamped with the render it was
//! taken against.

use std::cmp::Ordering;

use thiserror::Error;

use super::types::{Document, DocumentId, NodeId};

/// Why a boundary cannot be used against this document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("node is not part of this document")]
    UnknownNode,

    #[error("node is detached from the tree")]
    DetachedNode,

    #[error("boundary is not inside a text node")]
    NotTextNode,

    #[error("byte offset {offset} exceeds text length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("byte offset {0} is not on a character boundary")]
    OffsetNotCharBoundary(usize),
}

/// A position inside a text node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    /// Byte offset into the node's text, `0..=len`, on a character
    /// boundary.
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A raw user selection. Field names follow the browser selection model:
/// the anchor is where the drag started, the focus where it ended, and
/// either may precede the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Boundary,
    pub focus: Boundary,
}

impl Selection {
    pub fn new(anchor: Boundary, focus: Boundary) -> Self {
        Self { anchor, focus }
    }
}

/// A normalized range over one render: start precedes end in document
/// order and both boundaries were valid when the range was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocRange {
    pub doc: DocumentId,
    pub start: Boundary,
    pub end: Boundary,
}

impl DocRange {
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// A contiguous covered piece of one text node, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub node: NodeId,
    pub start: usize,
    pub end: usize,
}

impl Document {
    /// Validate that a boundary points into an attached text node of this
    /// document on a character boundary.
    pub fn check_boundary(&self, boundary: &Boundary) -> Result<(), RangeError> {
        if !self.contains_node(boundary.node) {
            return Err(RangeError::UnknownNode);
        }
        if !self.is_attached(boundary.node) {
            return Err(RangeError::DetachedNode);
        }
        let content = self.text(boundary.node).ok_or(RangeError::NotTextNode)?;
        if boundary.offset > content.len() {
            return Err(RangeError::OffsetOutOfBounds {
                offset: boundary.offset,
                len: content.len(),
            });
        }
        if !content.is_char_boundary(boundary.offset) {
            return Err(RangeError::OffsetNotCharBoundary(boundary.offset));
        }
        Ok(())
    }

    /// Path of child indices from the root. Lexicographic comparison of
    /// paths is document-order comparison of nodes.
    fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_in_parent(current) {
            path.push(index);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Document-order comparison of two valid boundaries.
    pub fn compare_boundaries(&self, a: &Boundary, b: &Boundary) -> Ordering {
        if a.node == b.node {
            return a.offset.cmp(&b.offset);
        }
        self.path(a.node).cmp(&self.path(b.node))
    }

    /// Deepest node containing both arguments.
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        if !self.contains_node(a) || !self.contains_node(b) {
            return None;
        }
        if a == b {
            return Some(a);
        }
        let mut chain_a: Vec<NodeId> = std::iter::once(a).chain(self.ancestors(a)).collect();
        let mut chain_b: Vec<NodeId> = std::iter::once(b).chain(self.ancestors(b)).collect();
        chain_a.reverse();
        chain_b.reverse();
        let mut common = None;
        for (x, y) in chain_a.iter().zip(chain_b.iter()) {
            if x == y {
                common = Some(*x);
            } else {
                break;
            }
        }
        common
    }

    /// Order a raw selection into a range over this render.
    pub fn normalize_selection(&self, selection: &Selection) -> Result<DocRange, RangeError> {
        self.check_boundary(&selection.anchor)?;
        self.check_boundary(&selection.focus)?;
        let (start, end) = match self.compare_boundaries(&selection.anchor, &selection.focus) {
            Ordering::Greater => (selection.focus, selection.anchor),
            _ => (selection.anchor, selection.focus),
        };
        Ok(DocRange {
            doc: self.id(),
            start,
            end,
        })
    }

    /// The text-node pieces a range covers, in document order. Zero-length
    /// pieces are dropped, so a range that merely touches a node at its
    /// edge does not cover it. A stale range covers nothing, whether it
    /// was taken against an earlier render or a structural edit has since
    /// broken its boundaries.
    pub fn segments(&self, range: &DocRange) -> Vec<Segment> {
        let mut segments = Vec::new();
        if range.doc != self.id() {
            return segments;
        }
        // A later wrap can split the node under a held boundary, leaving
        // its offset past the end of the shortened text.
        if self.check_boundary(&range.start).is_err() || self.check_boundary(&range.end).is_err() {
            return segments;
        }
        let mut inside = false;
        for id in self.walk() {
            let starts_here = id == range.start.node;
            let ends_here = id == range.end.node;
            if starts_here {
                inside = true;
            }
            if inside {
                if let Some(content) = self.text(id) {
                    let from = if starts_here { range.start.offset } else { 0 };
                    let to = if ends_here { range.end.offset } else { content.len() };
                    if from < to {
                        segments.push(Segment {
                            node: id,
                            start: from,
                            end: to,
                        });
                    }
                }
            }
            if ends_here {
                break;
            }
        }
        segments
    }

    /// The text a range covers, with a newline wherever the range crosses
    /// from one line-tracked block into another.
    pub fn range_text(&self, range: &DocRange) -> String {
        let mut out = String::new();
        let mut previous_block: Option<Option<NodeId>> = None;
        for segment in self.segments(range) {
            let block = self.enclosing_block(segment.node);
            if let Some(prev) = previous_block {
                if prev != block {
                    out.push('\n');
                }
            }
            if let Some(content) = self.text(segment.node) {
                out.push_str(&content[segment.start..segment.end]);
            }
            previous_block = Some(block);
        }
        out
    }

    /// Nearest self-or-ancestor element carrying a line span.
    fn enclosing_block(&self, id: NodeId) -> Option<NodeId> {
        if self.element(id).and_then(|el| el.lines).is_some() {
            return Some(id);
        }
        self.ancestors(id)
            .find(|&a| self.element(a).and_then(|el| el.lines).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::DocumentBuilder;
    use crate::store::CommentId;

    fn two_paragraphs() -> Document {
        let mut builder = DocumentBuilder::new();
        builder.begin_block("p", 1, 1).text("alpha beta").end();
        builder.begin_block("p", 3, 3).text("gamma delta").end();
        builder.finish()
    }

    fn text_node(doc: &Document, nth: usize) -> NodeId {
        doc.text_nodes().nth(nth).unwrap()
    }

    #[test]
    fn test_normalize_orders_reversed_selection() {
        let doc = two_paragraphs();
        let first = text_node(&doc, 0);
        let selection = Selection::new(Boundary::new(first, 5), Boundary::new(first, 2));

        let range = doc.normalize_selection(&selection).unwrap();
        assert_eq!(range.start.offset, 2);
        assert_eq!(range.end.offset, 5);
        assert_eq!(range.doc, doc.id());
    }

    #[test]
    fn test_normalize_orders_across_nodes() {
        let doc = two_paragraphs();
        let first = text_node(&doc, 0);
        let second = text_node(&doc, 1);
        let selection = Selection::new(Boundary::new(second, 3), Boundary::new(first, 6));

        let range = doc.normalize_selection(&selection).unwrap();
        assert_eq!(range.start.node, first);
        assert_eq!(range.end.node, second);
    }

    #[test]
    fn test_check_boundary_rejects_unknown_node() {
        let doc = two_paragraphs();
        let bogus = Boundary::new(NodeId(9999), 0);
        assert_eq!(doc.check_boundary(&bogus), Err(RangeError::UnknownNode));
    }

    #[test]
    fn test_check_boundary_rejects_element_node() {
        let doc = two_paragraphs();
        let boundary = Boundary::new(doc.root(), 0);
        assert_eq!(doc.check_boundary(&boundary), Err(RangeError::NotTextNode));
    }

    #[test]
    fn test_check_boundary_rejects_out_of_bounds_offset() {
        let doc = two_paragraphs();
        let boundary = Boundary::new(text_node(&doc, 0), 99);
        assert_eq!(
            doc.check_boundary(&boundary),
            Err(RangeError::OffsetOutOfBounds { offset: 99, len: 10 })
        );
    }

    #[test]
    fn test_check_boundary_rejects_mid_character_offset() {
        let mut builder = DocumentBuilder::new();
        builder.begin_block("p", 1, 1).text("héllo").end();
        let doc = builder.finish();

        let boundary = Boundary::new(text_node(&doc, 0), 2);
        assert_eq!(
            doc.check_boundary(&boundary),
            Err(RangeError::OffsetNotCharBoundary(2))
        );
    }

    #[test]
    fn test_segments_within_one_node() {
        let doc = two_paragraphs();
        let first = text_node(&doc, 0);
        let range = doc
            .normalize_selection(&Selection::new(
                Boundary::new(first, 6),
                Boundary::new(first, 10),
            ))
            .unwrap();

        let segments = doc.segments(&range);
        assert_eq!(
            segments,
            vec![Segment {
                node: first,
                start: 6,
                end: 10
            }]
        );
        assert_eq!(doc.range_text(&range), "beta");
    }

    #[test]
    fn test_segments_across_blocks_join_with_newline() {
        let doc = two_paragraphs();
        let first = text_node(&doc, 0);
        let second = text_node(&doc, 1);
        let range = doc
            .normalize_selection(&Selection::new(
                Boundary::new(first, 6),
                Boundary::new(second, 5),
            ))
            .unwrap();

        let segments = doc.segments(&range);
        assert_eq!(segments.len(), 2);
        assert_eq!(doc.range_text(&range), "beta\ngamma");
    }

    #[test]
    fn test_zero_length_touch_covers_nothing() {
        let doc = two_paragraphs();
        let first = text_node(&doc, 0);
        let second = text_node(&doc, 1);
        let range = doc
            .normalize_selection(&Selection::new(
                Boundary::new(first, 6),
                Boundary::new(second, 0),
            ))
            .unwrap();

        let segments = doc.segments(&range);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].node, first);
    }

    #[test]
    fn test_range_held_across_wrap_goes_stale() {
        let mut builder = DocumentBuilder::new();
        builder.begin_block("p", 1, 2).text("alpha beta gamma").end();
        let mut doc = builder.finish();
        let first = text_node(&doc, 0);
        let held = doc
            .normalize_selection(&Selection::new(
                Boundary::new(first, 6),
                Boundary::new(first, 16),
            ))
            .unwrap();

        // Wrapping "beta" splits the node the held range points into.
        let inner = doc
            .normalize_selection(&Selection::new(
                Boundary::new(first, 6),
                Boundary::new(first, 10),
            ))
            .unwrap();
        doc.wrap_highlight(&inner, CommentId(1)).unwrap();

        assert!(doc.segments(&held).is_empty());
        assert_eq!(doc.range_text(&held), "");
    }

    #[test]
    fn test_common_ancestor() {
        let mut builder = DocumentBuilder::new();
        builder.begin_block("ul", 1, 2);
        builder.begin_block("li", 1, 1).text("one").end();
        builder.begin_block("li", 2, 2).text("two").end();
        builder.end();
        let doc = builder.finish();

        let one = text_node(&doc, 0);
        let two = text_node(&doc, 1);
        let list = doc.children(doc.root())[0];

        assert_eq!(doc.common_ancestor(one, two), Some(list));
        assert_eq!(doc.common_ancestor(one, one), Some(one));
        assert_eq!(doc.common_ancestor(one, NodeId(9999)), None);
    }

    #[test]
    fn test_collapsed_range() {
        let doc = two_paragraphs();
        let first = text_node(&doc, 0);
        let range = doc
            .normalize_selection(&Selection::new(
                Boundary::new(first, 4),
                Boundary::new(first, 4),
            ))
            .unwrap();
        assert!(range.is_collapsed());
        assert!(doc.segments(&range).is_empty());
    }
}
