//! Rendered-document tree
//!
//! A reviewed file arrives as a tree of elements and text produced by a
//! renderer that stamps block-level elements with the source line range they
//! came from. The tree is an arena: nodes live in a flat vector and refer to
//! each other through [`NodeId`], so ids stay valid across the structural
//! edits highlighting performs (splitting text nodes, inserting and removing
//! wrapper elements).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::store::CommentId;

/// Identifies one [`Document`] instance for the lifetime of the process.
///
/// Every render gets a fresh id. Ranges captured against one render carry
/// the id and can never be applied to a later render by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        DocumentId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Index of a node in the document arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Inclusive 1-based source line range carried by a block element.
///
/// The renderer guarantees `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}

impl LineSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Combine optional wire bounds into a span. `None` unless both bounds
    /// are present.
    pub fn from_bounds(start: Option<u32>, end: Option<u32>) -> Option<LineSpan> {
        match (start, end) {
            (Some(start), Some(end)) => Some(LineSpan::new(start, end)),
            _ => None,
        }
    }

    /// Standard inclusive interval overlap test.
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start <= end && self.end >= start
    }
}

impl fmt::Display for LineSpan {
    /// Renders the line label shown next to an annotation: `L3` or `L3-5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "L{}", self.start)
        } else {
            write!(f, "L{}-{}", self.start, self.end)
        }
    }
}

/// An element node: tag name, optional source line range, optional
/// highlight marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Present on block-level elements the renderer tracked back to source
    /// lines; absent on inline elements and structural containers.
    pub lines: Option<LineSpan>,
    /// Present on highlight wrapper elements only.
    pub highlight: Option<CommentId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            lines: None,
            highlight: None,
        }
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// One render of the reviewed file.
///
/// Nodes are never deallocated while the document lives; structural edits
/// detach nodes instead (detached nodes keep their arena slot but are
/// unreachable from the root and skipped by every traversal).
///
/// The builder keeps the tree in normalized form: no two adjacent siblings
/// are both text nodes. Wrapping and unwrapping preserve that invariant,
/// which is what lets unwrapping restore the exact pre-wrap structure.
#[derive(Debug)]
pub struct Document {
    id: DocumentId,
    pub(crate) nodes: Vec<Node>,
    root: NodeId,
}

/// A clone is its own render: same tree, fresh [`DocumentId`]. Ranges
/// stamped against the original do not apply to the clone.
impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            id: DocumentId::next(),
            nodes: self.nodes.clone(),
            root: self.root,
        }
    }
}

impl Document {
    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// True when the id names a slot in this document's arena. Detached
    /// nodes still count; use [`Document::is_attached`] for reachability.
    pub fn contains_node(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// True when the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if !self.contains_node(id) {
            return false;
        }
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.nodes[current.0].parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.nodes.get(id.0).map(|node| &node.kind) {
            Some(NodeKind::Text(content)) => Some(content),
            _ => None,
        }
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id.0).map(|node| &node.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Parent chain of a node, nearest first. Does not yield the node
    /// itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            current: if self.contains_node(id) { Some(id) } else { None },
        }
    }

    /// True when `node` is `ancestor` itself or lies in its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Every attached node in document order (depth-first preorder).
    pub fn walk(&self) -> Walk<'_> {
        self.descendants(self.root)
    }

    /// The subtree rooted at `id` in document order, `id` included.
    pub fn descendants(&self, id: NodeId) -> Walk<'_> {
        Walk {
            doc: self,
            stack: if self.contains_node(id) {
                vec![id]
            } else {
                Vec::new()
            },
        }
    }

    /// Every attached text node in document order.
    pub fn text_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.walk().filter(|&id| self.is_text(id))
    }

    /// All text in document order. Block elements contribute a separating
    /// newline, the way a browser stringifies a multi-block selection.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.append_text(self.root, &mut out);
        out
    }

    fn append_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(content) => out.push_str(content),
            NodeKind::Element(element) => {
                if element.lines.is_some() && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for &child in &self.nodes[id.0].children {
                    self.append_text(child, out);
                }
            }
        }
    }

    // Mutation primitives used by the wrap module. These do not maintain
    // tree invariants on their own; the wrap operations do.

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        self.nodes[id.0].parent = parent;
    }

    pub(crate) fn set_text(&mut self, id: NodeId, content: String) {
        self.nodes[id.0].kind = NodeKind::Text(content);
    }

    pub(crate) fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.nodes.get(id.0)?.parent?;
        self.nodes[parent.0].children.iter().position(|&c| c == id)
    }
}

/// Document-order traversal, see [`Document::walk`].
pub struct Walk<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        for &child in self.doc.nodes[id.0].children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}

/// Parent-chain traversal, see [`Document::ancestors`].
pub struct Ancestors<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        let parent = self.doc.nodes[id.0].parent;
        self.current = parent;
        parent
    }
}

/// Builds a [`Document`] the way the renderer emits it: open an element,
/// add text and children, close it.
///
/// The root element is implicit. Consecutive [`DocumentBuilder::text`]
/// calls extend the same text node, so the finished tree never holds
/// adjacent text siblings.
pub struct DocumentBuilder {
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Element(Element::new("article")),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            stack: vec![NodeId(0)],
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(NodeId(0))
    }

    /// Open a block-level element tracked back to source lines.
    pub fn begin_block(&mut self, tag: &str, line_start: u32, line_end: u32) -> &mut Self {
        let mut element = Element::new(tag);
        element.lines = Some(LineSpan::new(line_start, line_end));
        self.open(element)
    }

    /// Open an inline or structural element without line information.
    pub fn begin_element(&mut self, tag: &str) -> &mut Self {
        self.open(Element::new(tag))
    }

    fn open(&mut self, element: Element) -> &mut Self {
        let parent = self.current();
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Element(element),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        self.stack.push(id);
        self
    }

    /// Append text under the open element.
    pub fn text(&mut self, content: &str) -> &mut Self {
        if content.is_empty() {
            return self;
        }
        let parent = self.current();
        let last_child = self.nodes[parent.0].children.last().copied();
        if let Some(last) = last_child {
            if let NodeKind::Text(existing) = &mut self.nodes[last.0].kind {
                existing.push_str(content);
                return self;
            }
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Text(content.to_string()),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        self
    }

    /// Close the most recently opened element.
    pub fn end(&mut self) -> &mut Self {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self
    }

    /// Finish the tree. Unclosed elements are closed implicitly.
    pub fn finish(self) -> Document {
        Document {
            id: DocumentId::next(),
            nodes: self.nodes,
            root: NodeId(0),
        }
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
