//! Incremental PowerShell lexer: per-byte styling and fold levels.
//!
//! Two passes over a [`StyledDocument`](psh_styler::StyledDocument), both
//! restartable at any line boundary:
//!
//! * [`tokenize`] assigns a [`Style`] to every byte of a range and
//!   persists a packed state per line so a later scan can resume where an
//!   edit happened instead of restarting from the top of the file.
//! * [`fold`] derives a fold level per line from the styles, brackets and
//!   whole-line-comment runs, again resuming from the previous line's
//!   stored level.
//!
//! The host owns the document and the word lists; the engine only reads
//! text and writes styles, line states and fold cells.

mod folder;
mod keywords;
mod line_state;
mod styles;
mod tokenizer;

pub use folder::{fold, FOLD_HEADER_FLAG, FOLD_LEVEL_BASE};
pub use keywords::KeywordSets;
pub use styles::Style;
pub use tokenizer::tokenize;

use psh_styler::StyledDocument;

/// Entry points for one language, as registered with a host's lexer
/// catalog. Both functions take a range starting at a line boundary and
/// the style in effect there.
pub struct LexerDescriptor {
    pub language: &'static str,
    pub tokenize: fn(&mut StyledDocument, u32, u32, Style, &KeywordSets),
    pub fold: fn(&mut StyledDocument, u32, u32, Style),
}

/// The PowerShell lexer.
pub const POWERSHELL: LexerDescriptor = LexerDescriptor {
    language: "powershell",
    tokenize,
    fold,
};
