//! Anchor resolution
//!
//! Re-locates a stored anchor in the current render. Line bounds narrow
//! the search to the blocks overlapping the anchor's line range; inside
//! them, the first text node containing the anchor text wins, at its
//! first occurrence. Without bounds the whole document is searched the
//! same way.
//!
//! First match is the whole policy. Identical text in two places resolves
//! to whichever comes first in document order within the candidate
//! blocks; the line bounds are what keep duplicates apart in practice.

use super::types::Anchor;
use crate::doc::{Boundary, DocRange, Document, LineIndex, NodeId};

/// Find the anchor's text in the current render.
///
/// `None` means not found, an expected outcome after the source changed;
/// callers log it and keep the comment unresolved.
pub fn resolve(doc: &Document, index: &LineIndex, anchor: &Anchor) -> Option<DocRange> {
    if anchor.text.is_empty() {
        return None;
    }
    match (anchor.line_start, anchor.line_end) {
        (Some(line_start), Some(line_end)) => {
            let blocks = index.blocks_overlapping(line_start, line_end);
            find_first(
                doc,
                blocks.iter().flat_map(|block| doc.descendants(block.node)),
                &anchor.text,
            )
        }
        // No line information survived capture; scan every text node.
        _ => find_first(doc, doc.walk(), &anchor.text),
    }
}

fn find_first(
    doc: &Document,
    nodes: impl Iterator<Item = NodeId>,
    text: &str,
) -> Option<DocRange> {
    for node in nodes {
        let Some(content) = doc.text(node) else {
            continue;
        };
        if let Some(at) = content.find(text) {
            return Some(DocRange {
                doc: doc.id(),
                start: Boundary::new(node, at),
                end: Boundary::new(node, at + text.len()),
            });
        }
    }
    None
}
