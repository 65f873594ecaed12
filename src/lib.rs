//! Marginalia
//!
//! Annotation overlay engine for line-tracked rendered documents. A
//! renderer turns a reviewed source file into a block tree whose
//! elements remember which source lines they came from; this crate
//! anchors reader comments to selections in that tree, paints them as
//! highlight wrappers, and keeps everything consistent with a remote
//! comment store while the file keeps changing underneath.
//!
//! # Modules
//!
//! - `doc`: Rendered document tree, line index, and highlight wrapping
//! - `anchor`: Capturing selections and resolving stored anchors
//! - `overlay`: Highlight lifecycle and the derived annotation list
//! - `store`: Wire types and the HTTP client for the comment store
//! - `session`: Per-file review sessions tying the layers together

pub mod anchor;
pub mod config;
pub mod doc;
pub mod error;
pub mod overlay;
pub mod session;
pub mod store;

pub use error::{Error, Result};
