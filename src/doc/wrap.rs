//! Highlight wrapping
//!
//! Wrapping splits the text node under a range and inserts a `mark`
//! element around the covered piece. Unwrapping splices the text back and
//! mends the split, so removing a highlight restores the exact pre-wrap
//! tree: same shape, byte-identical text.

use thiserror::Error;

use super::range::{DocRange, RangeError};
use super::types::{Document, Element, NodeId, NodeKind};
use crate::store::CommentId;

/// Tag of highlight wrapper elements.
pub const HIGHLIGHT_TAG: &str = "mark";

/// Why a range could not be wrapped, or a wrapper not removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WrapError {
    /// The range was captured against a different render of the document.
    #[error("range does not belong to this render of the document")]
    StaleRange,

    #[error("invalid boundary: {0}")]
    Boundary(#[from] RangeError),

    #[error("range start and end lie in different text nodes")]
    SpansNodes,

    #[error("range covers no text")]
    EmptyRange,

    #[error("node is not a highlight wrapper")]
    NotAWrapper,

    #[error("wrapper is detached from the document")]
    DetachedWrapper,
}

impl Document {
    /// Wrap the covered text in a highlight element carrying the comment
    /// id and return the wrapper's node id.
    ///
    /// The range must lie within a single text node, which gets split
    /// around the covered piece. The covered piece keeps its node id and
    /// moves under the wrapper.
    pub fn wrap_highlight(
        &mut self,
        range: &DocRange,
        comment: CommentId,
    ) -> Result<NodeId, WrapError> {
        if range.doc != self.id() {
            return Err(WrapError::StaleRange);
        }
        self.check_boundary(&range.start)?;
        self.check_boundary(&range.end)?;
        if range.start.node != range.end.node {
            return Err(WrapError::SpansNodes);
        }
        if range.start.offset >= range.end.offset {
            return Err(WrapError::EmptyRange);
        }

        let target = range.start.node;
        let parent = self
            .parent(target)
            .ok_or(WrapError::Boundary(RangeError::DetachedNode))?;
        let position = self
            .index_in_parent(target)
            .ok_or(WrapError::Boundary(RangeError::DetachedNode))?;
        let content = match self.text(target) {
            Some(content) => content.to_string(),
            None => return Err(WrapError::Boundary(RangeError::NotTextNode)),
        };

        let before = content[..range.start.offset].to_string();
        let covered = content[range.start.offset..range.end.offset].to_string();
        let after = content[range.end.offset..].to_string();

        let wrapper = self.alloc(NodeKind::Element(Element {
            tag: HIGHLIGHT_TAG.to_string(),
            lines: None,
            highlight: Some(comment),
        }));

        // The target node keeps the covered piece and moves under the
        // wrapper; the split-off remainders become fresh siblings. Empty
        // remainders are not materialized, so wrapping a whole node adds
        // no empty text siblings.
        self.set_text(target, covered);
        let mut replacement = Vec::with_capacity(3);
        if !before.is_empty() {
            let node = self.alloc(NodeKind::Text(before));
            self.set_parent(node, Some(parent));
            replacement.push(node);
        }
        replacement.push(wrapper);
        if !after.is_empty() {
            let node = self.alloc(NodeKind::Text(after));
            self.set_parent(node, Some(parent));
            replacement.push(node);
        }
        self.set_parent(wrapper, Some(parent));
        self.nodes[parent.0]
            .children
            .splice(position..=position, replacement);
        self.nodes[wrapper.0].children.push(target);
        self.set_parent(target, Some(wrapper));

        tracing::debug!(
            "wrapped {} bytes for comment {}",
            range.end.offset - range.start.offset,
            comment
        );
        Ok(wrapper)
    }

    /// Remove a highlight wrapper, splicing its content back into place
    /// and merging the split text nodes.
    pub fn unwrap_highlight(&mut self, wrapper: NodeId) -> Result<(), WrapError> {
        let element = self.element(wrapper).ok_or(WrapError::NotAWrapper)?;
        if element.highlight.is_none() {
            return Err(WrapError::NotAWrapper);
        }
        if !self.is_attached(wrapper) {
            return Err(WrapError::DetachedWrapper);
        }
        let parent = self.parent(wrapper).ok_or(WrapError::DetachedWrapper)?;
        let position = self
            .index_in_parent(wrapper)
            .ok_or(WrapError::DetachedWrapper)?;

        let children = self.nodes[wrapper.0].children.clone();
        self.nodes[parent.0]
            .children
            .splice(position..=position, children.iter().copied());
        for &child in &children {
            self.set_parent(child, Some(parent));
        }
        self.nodes[wrapper.0].children.clear();
        self.set_parent(wrapper, None);

        self.merge_text_children(parent);
        Ok(())
    }

    /// Merge adjacent text-node children, keeping the left node of each
    /// pair. Restores the normalized form after a wrapper is spliced out.
    fn merge_text_children(&mut self, parent: NodeId) {
        let mut index = 0;
        while index + 1 < self.nodes[parent.0].children.len() {
            let left = self.nodes[parent.0].children[index];
            let right = self.nodes[parent.0].children[index + 1];
            if self.is_text(left) && self.is_text(right) {
                let tail = match self.text(right) {
                    Some(content) => content.to_string(),
                    None => String::new(),
                };
                if let NodeKind::Text(content) = &mut self.nodes[left.0].kind {
                    content.push_str(&tail);
                }
                self.nodes[parent.0].children.remove(index + 1);
                self.set_parent(right, None);
            } else {
                index += 1;
            }
        }
    }

    /// True when the node or any of its ancestors is a highlight wrapper.
    pub fn inside_highlight(&self, id: NodeId) -> bool {
        let is_wrapper =
            |node: NodeId| self.element(node).map(|el| el.highlight.is_some()).unwrap_or(false);
        is_wrapper(id) || self.ancestors(id).any(is_wrapper)
    }

    /// Attached highlight wrappers in document order, each with the
    /// comment it belongs to.
    pub fn highlights(&self) -> Vec<(NodeId, CommentId)> {
        self.walk()
            .filter_map(|id| {
                self.element(id)
                    .and_then(|el| el.highlight)
                    .map(|comment| (id, comment))
            })
            .collect()
    }
}
