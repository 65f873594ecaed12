//! Rendered-document model
//!
//! One render of the reviewed file: an arena tree of elements and text,
//! where block-level elements remember the source line range the renderer
//! produced them from. On top of the tree sit the pieces anchoring needs:
//!
//! - the [`LineIndex`], a document-order table of line-tracked blocks
//! - [`Selection`] / [`DocRange`], byte-offset positions in text nodes
//! - the wrap operations, which splice highlight `mark` elements into the
//!   tree and back out without disturbing the text

mod index;
mod range;
mod types;
mod wrap;

// Re-export the tree and builder
pub use types::{
    Ancestors, Document, DocumentBuilder, DocumentId, Element, LineSpan, NodeId, NodeKind, Walk,
};

// Re-export positions and ranges
pub use range::{Boundary, DocRange, RangeError, Segment, Selection};

// Re-export the line index
pub use index::{Block, LineIndex};

// Re-export wrapping
pub use wrap::{WrapError, HIGHLIGHT_TAG};
