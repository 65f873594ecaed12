//! Line index
//!
//! The renderer stamps block-level elements with the source line range they
//! were rendered from. The index collects those blocks once per render, in
//! document order, and answers the two queries anchoring needs: which
//! blocks overlap a line range, and which blocks a selection actually
//! covers.

use super::range::DocRange;
use super::types::{Document, LineSpan, NodeId};

/// A block-level element that carries a source line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub node: NodeId,
    pub lines: LineSpan,
}

/// Document-order index of the line-tracked blocks of one render.
///
/// Nested blocks (a list and its items, say) each appear as their own
/// entry, outer before inner.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    blocks: Vec<Block>,
}

impl LineIndex {
    /// Collect every line-tracked block of the document.
    pub fn build(doc: &Document) -> Self {
        let blocks = doc
            .walk()
            .filter_map(|id| {
                doc.element(id)
                    .and_then(|el| el.lines)
                    .map(|lines| Block { node: id, lines })
            })
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Blocks whose line range overlaps the inclusive range
    /// `[line_start, line_end]`, in document order.
    pub fn blocks_overlapping(&self, line_start: u32, line_end: u32) -> Vec<Block> {
        self.blocks
            .iter()
            .copied()
            .filter(|block| block.lines.overlaps(line_start, line_end))
            .collect()
    }

    /// Blocks whose subtree contains at least one covered character of the
    /// selection, in document order. A block the range only touches at an
    /// edge is not included.
    pub fn blocks_intersecting(&self, doc: &Document, range: &DocRange) -> Vec<Block> {
        let segments = doc.segments(range);
        self.blocks
            .iter()
            .copied()
            .filter(|block| {
                segments
                    .iter()
                    .any(|segment| doc.contains(block.node, segment.node))
            })
            .collect()
    }
}
