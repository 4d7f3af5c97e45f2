//! Styled-document substrate for an incremental syntax highlighter.
//!
//! This crate is the host side of the highlighting contract: it owns the
//! source text, one style byte per source byte, one opaque state integer
//! per line, and one fold-level cell per line. A language engine drives a
//! [`ScanContext`] over a byte range of the document and commits style
//! runs as it goes.
//!
//! Styles are stored as raw bytes. The language engine supplies its own
//! style enum and converts at the seam (`S: Into<u8>`), so this crate
//! stays language-agnostic.

mod document;
mod scan_context;

pub use document::StyledDocument;
pub use scan_context::ScanContext;
